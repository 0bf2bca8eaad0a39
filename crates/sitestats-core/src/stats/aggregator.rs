use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::{debug, trace, warn};

use crate::calendar::{DateInterval, StatsCalendar};
use crate::models::{DataPoint, Granularity, MetricType, PeriodData};

/// Running sum and count for one bucket. The sum saturates at the `i64`
/// bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct BucketAccumulator {
    sum: i64,
    count: i64,
}

impl BucketAccumulator {
    fn update(&mut self, value: i64) {
        self.sum = self.sum.saturating_add(value);
        self.count += 1;
    }
}

/// Groups raw observations into calendar buckets and fills gaps.
///
/// Stateless apart from the calendar it was built with; every method is a
/// pure function of its arguments.
///
/// ```
/// use chrono::{DateTime, Utc};
/// use sitestats_core::{DataPoint, Granularity, SiteMetric, StatsCalendar, StatsDataAggregator};
///
/// let at = |s: &str| DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc);
/// let aggregator = StatsDataAggregator::new(StatsCalendar::utc());
/// let points = [
///     DataPoint::new(at("2025-01-15T10:15:00Z"), 120),
///     DataPoint::new(at("2025-01-15T14:30:00Z"), 200),
///     DataPoint::new(at("2025-01-16T11:20:00Z"), 300),
/// ];
///
/// let daily = aggregator.aggregate(&points, Granularity::Day, SiteMetric::Views);
/// assert_eq!(daily[&at("2025-01-15T00:00:00Z")], 320);
///
/// let bounce = aggregator.aggregate(&points, Granularity::Day, SiteMetric::BounceRate);
/// assert_eq!(bounce[&at("2025-01-15T00:00:00Z")], 160);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsDataAggregator {
    calendar: StatsCalendar,
}

impl StatsDataAggregator {
    pub fn new(calendar: StatsCalendar) -> Self {
        Self { calendar }
    }

    pub fn calendar(&self) -> &StatsCalendar {
        &self.calendar
    }

    /// Reduce points into one value per bucket that saw at least one point.
    /// Empty buckets are absent, not zero.
    pub fn aggregate<M: MetricType>(
        &self,
        points: &[DataPoint],
        granularity: Granularity,
        metric: M,
    ) -> HashMap<DateTime<Utc>, i64> {
        let mut buckets: HashMap<DateTime<Utc>, BucketAccumulator> = HashMap::new();

        for point in points {
            match self.calendar.start_of(point.date, granularity) {
                Some(bucket) => buckets.entry(bucket).or_default().update(point.value),
                None => warn!(date = %point.date, %granularity, "Skipping point with unresolvable bucket"),
            }
        }

        let strategy = metric.aggregation_strategy();
        buckets
            .into_iter()
            .filter_map(|(bucket, acc)| strategy.reduce(acc.sum, acc.count).map(|value| (bucket, value)))
            .collect()
    }

    /// Every `step * unit` instant from `interval.start` while before
    /// `interval.end` and not after `now`. Stops early if calendar
    /// arithmetic fails to move forward.
    pub fn generate_date_sequence(
        &self,
        interval: &DateInterval,
        unit: Granularity,
        step: i32,
        now: DateTime<Utc>,
    ) -> Vec<DateTime<Utc>> {
        let mut dates = Vec::new();
        let mut current = interval.start;

        while current < interval.end && current <= now {
            dates.push(current);
            match self.calendar.add(current, unit, step) {
                Some(next) if next > current => current = next,
                _ => {
                    warn!(date = %current, %unit, step, "Date sequence stopped advancing");
                    break;
                }
            }
        }

        dates
    }

    /// Aggregate `points` and lay them over one bucket per expected step in
    /// `interval`, zero-filling buckets without data.
    ///
    /// The total uses the metric's strategy over the dense series, so an
    /// average divides by every expected bucket including the zero-filled
    /// ones.
    pub fn process_period<M: MetricType>(
        &self,
        points: &[DataPoint],
        interval: &DateInterval,
        granularity: Granularity,
        metric: M,
        now: DateTime<Utc>,
    ) -> PeriodData {
        let aggregated = self.aggregate(points, granularity, metric);
        let dates = self.generate_date_sequence(interval, granularity, 1, now);

        let data_points: Vec<DataPoint> = dates
            .into_iter()
            .map(|date| {
                // Lookup by bucket start so an unaligned interval start
                // still finds its bucket.
                let bucket = self.calendar.start_of(date, granularity).unwrap_or(date);
                DataPoint::new(date, aggregated.get(&bucket).copied().unwrap_or(0))
            })
            .collect();

        let total = DataPoint::total_value(&data_points, metric);

        trace!(
            metric = ?metric,
            %granularity,
            points = points.len(),
            buckets = aggregated.len(),
            "Aggregated observations"
        );
        debug!(
            metric = ?metric,
            %granularity,
            series_len = data_points.len(),
            total = ?total,
            "Processed period"
        );

        PeriodData { data_points, total }
    }
}
