pub mod aggregator;
pub mod chart;
pub mod top_list;
pub mod trend;

pub use aggregator::StatsDataAggregator;
pub use chart::{ChartData, SignificantPoints};
pub use top_list::{index_by_id, merge_top_list, TopListData, TopListMetrics};
pub use trend::{Trend, TrendDirection, TrendSentiment};
