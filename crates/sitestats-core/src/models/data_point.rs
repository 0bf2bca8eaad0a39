use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::metric::{AggregationStrategy, MetricType};
use crate::calendar::DateInterval;

/// A single observation in a time series.
///
/// The instant is absolute; which bucket it belongs to depends on the
/// calendar it is aggregated with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataPoint {
    pub date: DateTime<Utc>,
    /// Monetary values are stored in cents.
    pub value: i64,
}

impl DataPoint {
    pub fn new(date: DateTime<Utc>, value: i64) -> Self {
        Self { date, value }
    }

    /// Reduce a whole series with the metric's strategy. The divisor of an
    /// average is the series length, so zero-filled gaps pull it down.
    /// `None` for an empty series. Sums saturate at the `i64` bounds.
    pub fn total_value<M: MetricType>(points: &[DataPoint], metric: M) -> Option<i64> {
        Self::total_with(points, metric.aggregation_strategy())
    }

    pub fn total_with(points: &[DataPoint], strategy: AggregationStrategy) -> Option<i64> {
        if points.is_empty() {
            return None;
        }
        let sum = points.iter().fold(0i64, |sum, p| sum.saturating_add(p.value));
        strategy.reduce(sum, points.len() as i64)
    }

    /// Put `previous` values on `current` dates, pairing from the most recent
    /// element backward. The result has `min(current.len(), previous.len())`
    /// points; surplus early elements of the longer series are dropped.
    pub fn align_previous(current: &[DataPoint], previous: &[DataPoint]) -> Vec<DataPoint> {
        let mut aligned: Vec<DataPoint> = current
            .iter()
            .rev()
            .zip(previous.iter().rev())
            .map(|(current, previous)| DataPoint::new(current.date, previous.value))
            .collect();
        aligned.reverse();
        aligned
    }

    /// Shift every previous point by the offset between the two interval
    /// starts and keep the ones that land inside the current interval.
    ///
    /// Unlike [`DataPoint::align_previous`] this keeps all previous data even
    /// when the current series is partial or empty.
    pub fn map_previous(
        previous: &[DataPoint],
        current_interval: &DateInterval,
        comparison_interval: &DateInterval,
    ) -> Vec<DataPoint> {
        let offset = current_interval.start - comparison_interval.start;
        previous
            .iter()
            .filter_map(|point| {
                let mapped = point.date.checked_add_signed(offset)?;
                current_interval
                    .contains(mapped)
                    .then(|| DataPoint::new(mapped, point.value))
            })
            .collect()
    }
}

/// A dense series for one period together with its total.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodData {
    pub data_points: Vec<DataPoint>,
    /// Absent when the period produced no buckets at all.
    pub total: Option<i64>,
}
