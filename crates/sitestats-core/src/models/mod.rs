pub mod data_point;
pub mod granularity;
pub mod metric;
pub mod metrics_set;
pub mod top_list_item;

pub use data_point::{DataPoint, PeriodData};
pub use granularity::Granularity;
pub use metric::{AggregationStrategy, MetricSpec, MetricType, SiteMetric, WordAdsMetric};
pub use metrics_set::{MetricsSet, SiteMetricsSet, WordAdsMetricsSet};
pub use top_list_item::{
    ArchiveItem, ArchiveSection, Author, ExternalLink, FileDownload, Location, Post, RankedItem,
    Referrer, SearchTerm, TopListItem, TopListItemId, TopListItemType, Video,
};
