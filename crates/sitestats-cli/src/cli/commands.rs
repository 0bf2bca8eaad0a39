use std::path::PathBuf;

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use clap::{Args, ValueEnum};
use serde::Serialize;
use sitestats_core::{
    merge_top_list, ChartData, ComparisonPeriod, DataPoint, DateInterval, Granularity, MetricType,
    NavigationDirection, RankedItem, SiteMetric, StatsCalendar, StatsConfig, StatsDataAggregator,
    TopListData, TopListItem, TopListItemType, TopListMetrics, Trend, TrendDirection, TrendSentiment,
    WordAdsMetric,
};
use tracing::info;

use super::input::{read_points, read_snapshots};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CompareMode {
    Preceding,
    LastYear,
}

impl From<CompareMode> for ComparisonPeriod {
    fn from(mode: CompareMode) -> Self {
        match mode {
            CompareMode::Preceding => ComparisonPeriod::PrecedingPeriod,
            CompareMode::LastYear => ComparisonPeriod::SamePeriodLastYear,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct SeriesArgs {
    /// JSON file with `[{"date", "value"}]` observations
    #[arg(long, short)]
    pub input: PathBuf,

    /// Metric key (e.g. views, bounceRate, cpm)
    #[arg(long, short)]
    pub metric: String,

    /// Interval start (RFC 3339)
    #[arg(long)]
    pub start: DateTime<Utc>,

    /// Interval end, exclusive (RFC 3339)
    #[arg(long)]
    pub end: DateTime<Utc>,

    /// Bucket size; picked from the interval length when omitted
    #[arg(long, short)]
    pub granularity: Option<Granularity>,

    /// Also compute the comparison period and trend
    #[arg(long, value_enum)]
    pub compare: Option<CompareMode>,
}

#[derive(Args, Debug, Clone)]
pub struct TopArgs {
    /// JSON file mapping each day to the items seen that day
    #[arg(long, short)]
    pub input: PathBuf,

    /// Item kind to rank (e.g. postsAndPages, referrers, locations)
    #[arg(long, short = 't')]
    pub item_type: TopListItemType,

    /// Site metric key to rank by
    #[arg(long, short, default_value = "views")]
    pub metric: SiteMetric,

    /// Interval start (RFC 3339)
    #[arg(long)]
    pub start: DateTime<Utc>,

    /// Interval end, exclusive (RFC 3339)
    #[arg(long)]
    pub end: DateTime<Utc>,

    /// Number of items to keep; overrides the config
    #[arg(long, short)]
    pub limit: Option<usize>,
}

// =============================================================================
// Reports
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendReport {
    pub current: i64,
    pub previous: i64,
    pub sign: char,
    pub direction: TrendDirection,
    pub sentiment: TrendSentiment,
    pub change: i64,
    pub percentage: Option<f64>,
}

impl From<Trend> for TrendReport {
    fn from(trend: Trend) -> Self {
        Self {
            current: trend.current,
            previous: trend.previous,
            sign: trend.sign(),
            direction: trend.direction(),
            sentiment: trend.sentiment(),
            change: trend.change(),
            percentage: trend.percentage(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Navigation {
    pub backward: bool,
    pub forward: bool,
}

impl Navigation {
    fn for_interval(calendar: &StatsCalendar, interval: &DateInterval, now: DateTime<Utc>) -> Self {
        Self {
            backward: calendar.can_navigate(interval, NavigationDirection::Backward, now),
            forward: calendar.can_navigate(interval, NavigationDirection::Forward, now),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonReport {
    pub interval: DateInterval,
    pub data_points: Vec<DataPoint>,
    pub total: Option<i64>,
    /// Previous values paired with current dates from the most recent end
    pub aligned: Vec<DataPoint>,
    /// Previous points shifted by the offset between the interval starts
    pub mapped: Vec<DataPoint>,
    pub trend: TrendReport,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesReport {
    pub metric: &'static str,
    pub granularity: Granularity,
    pub interval: DateInterval,
    pub data_points: Vec<DataPoint>,
    pub total: Option<i64>,
    pub max_value: i64,
    pub is_empty_or_zero: bool,
    pub navigation: Navigation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<ComparisonReport>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntry {
    pub rank: usize,
    pub id: String,
    pub name: String,
    pub value: Option<i64>,
    pub previous_value: Option<i64>,
    pub item: TopListItem,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopReport {
    pub item_type: TopListItemType,
    pub metric: SiteMetric,
    pub interval: DateInterval,
    pub previous_interval: DateInterval,
    pub items: Vec<RankedEntry>,
    pub metrics: TopListMetrics,
}

// =============================================================================
// Commands
// =============================================================================

pub fn run_series(config: &StatsConfig, args: &SeriesArgs, now: DateTime<Utc>) -> Result<SeriesReport> {
    let points = read_points(&args.input)?;

    if let Some(metric) = SiteMetric::from_key(&args.metric) {
        series_report(config, args, metric, &points, now)
    } else if let Some(metric) = WordAdsMetric::from_key(&args.metric) {
        series_report(config, args, metric, &points, now)
    } else {
        bail!("Unknown metric: {}", args.metric)
    }
}

fn series_report<M: MetricType>(
    config: &StatsConfig,
    args: &SeriesArgs,
    metric: M,
    points: &[DataPoint],
    now: DateTime<Utc>,
) -> Result<SeriesReport> {
    let calendar = config.calendar()?;
    let aggregator = StatsDataAggregator::new(calendar);
    let interval = DateInterval::try_new(args.start, args.end)?;
    let granularity = args
        .granularity
        .unwrap_or_else(|| Granularity::preferred_for(&interval));

    let current = aggregator.process_period(points, &interval, granularity, metric, now);

    let (previous, previous_interval) = match args.compare {
        Some(mode) => {
            let previous_interval = calendar.comparison_interval(&interval, mode.into(), granularity);
            let previous =
                aggregator.process_period(points, &previous_interval, granularity, metric, now);
            (previous, Some(previous_interval))
        }
        None => Default::default(),
    };

    // The current period may stop at `now`, so the chart shifts previous
    // points by date instead of pairing them from the end.
    let mapped = previous_interval
        .map(|previous_interval| {
            DataPoint::map_previous(&previous.data_points, &interval, &previous_interval)
        })
        .unwrap_or_default();
    let aligned = DataPoint::align_previous(&current.data_points, &previous.data_points);
    let chart = ChartData::new(metric, granularity, current, previous, mapped);

    info!(
        metric = metric.key(),
        %granularity,
        buckets = chart.current.data_points.len(),
        "Computed series"
    );

    let comparison = previous_interval.map(|previous_interval| ComparisonReport {
        interval: previous_interval,
        data_points: chart.previous.data_points.clone(),
        total: chart.previous.total,
        aligned,
        mapped: chart.mapped_previous.clone(),
        trend: chart.trend().into(),
    });

    Ok(SeriesReport {
        metric: metric.key(),
        granularity,
        interval,
        data_points: chart.current.data_points.clone(),
        total: chart.current.total,
        max_value: chart.max_value,
        is_empty_or_zero: chart.is_empty_or_zero,
        navigation: Navigation::for_interval(&calendar, &interval, now),
        comparison,
    })
}

/// Rank items over the interval and compare against the preceding period
/// of the same number of days.
pub fn run_top(config: &StatsConfig, args: &TopArgs) -> Result<TopReport> {
    let calendar = config.calendar()?;
    let interval = DateInterval::try_new(args.start, args.end)?;
    let previous_interval =
        calendar.comparison_interval(&interval, ComparisonPeriod::PrecedingPeriod, Granularity::Day);
    let limit = args.limit.or(config.top_list_limit);

    let snapshots = read_snapshots(&args.input, args.item_type)?;
    let current = merge_top_list(&snapshots, &interval, args.metric, limit);
    // Previous items are only looked up by identity, so keep all of them
    let previous = merge_top_list(&snapshots, &previous_interval, args.metric, None);

    let data = TopListData::new(args.metric, current, previous);

    info!(
        item_type = %args.item_type,
        metric = args.metric.key(),
        items = data.items().len(),
        "Computed top list"
    );

    let items = data
        .items()
        .iter()
        .enumerate()
        .map(|(index, item)| RankedEntry {
            rank: index + 1,
            id: item.id().to_string(),
            name: item.display_name(),
            value: item.value(args.metric),
            previous_value: data
                .previous_item(item)
                .and_then(|previous| previous.value(args.metric)),
            item: item.clone(),
        })
        .collect();

    Ok(TopReport {
        item_type: args.item_type,
        metric: args.metric,
        interval,
        previous_interval,
        items,
        metrics: *data.metrics(),
    })
}
