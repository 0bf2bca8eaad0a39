/// Errors raised while building a calendar context or parsing caller input.
///
/// The aggregation functions themselves never fail; degenerate input
/// produces empty output instead.
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("Invalid time zone: {name}")]
    InvalidTimeZone { name: String },

    #[error("Unknown metric: {key}")]
    UnknownMetric { key: String },

    #[error("Unknown granularity: {value}")]
    UnknownGranularity { value: String },

    #[error("Unknown top list item type: {value}")]
    UnknownItemType { value: String },

    #[error("Invalid interval: end {end} is before start {start}")]
    InvalidInterval { start: String, end: String },
}
