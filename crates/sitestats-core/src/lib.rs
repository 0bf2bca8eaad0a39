pub mod calendar;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod stats;

pub use calendar::{ComparisonPeriod, DateInterval, NavigationDirection, StatsCalendar};
pub use config::StatsConfig;
pub use error::StatsError;
pub use models::{
    AggregationStrategy, DataPoint, Granularity, MetricSpec, MetricType, MetricsSet, PeriodData,
    RankedItem, SiteMetric, SiteMetricsSet, TopListItem, TopListItemId, TopListItemType,
    WordAdsMetric,
};
pub use stats::{
    merge_top_list, ChartData, SignificantPoints, StatsDataAggregator, TopListData, TopListMetrics,
    Trend, TrendDirection, TrendSentiment,
};
