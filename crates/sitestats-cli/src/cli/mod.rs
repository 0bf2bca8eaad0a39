pub mod commands;
pub mod config;
pub mod input;

pub use commands::{run_series, run_top, CompareMode, SeriesArgs, SeriesReport, TopArgs, TopReport};
