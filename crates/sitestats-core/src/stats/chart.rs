use serde::Serialize;

use super::trend::Trend;
use crate::models::{DataPoint, Granularity, MetricType, PeriodData};

/// Points a chart highlights. The minimums ignore zero values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignificantPoints {
    pub current_max: Option<DataPoint>,
    pub current_min: Option<DataPoint>,
    pub previous_max: Option<DataPoint>,
    pub previous_min: Option<DataPoint>,
}

/// Current and previous period of one metric, ready to render.
#[derive(Debug, Clone)]
pub struct ChartData<M: MetricType> {
    pub metric: M,
    pub granularity: Granularity,
    pub current: PeriodData,
    pub previous: PeriodData,
    /// Previous values placed on current dates.
    pub mapped_previous: Vec<DataPoint>,
    pub max_value: i64,
    pub significant_points: SignificantPoints,
    pub is_empty_or_zero: bool,
}

impl<M: MetricType> ChartData<M> {
    pub fn new(
        metric: M,
        granularity: Granularity,
        current: PeriodData,
        previous: PeriodData,
        mapped_previous: Vec<DataPoint>,
    ) -> Self {
        let mut max_value = 0;
        let mut points = SignificantPoints::default();

        for point in &current.data_points {
            if point.value > max_value {
                max_value = point.value;
                points.current_max = Some(*point);
            }
            if point.value > 0 && points.current_min.map_or(true, |min| point.value < min.value) {
                points.current_min = Some(*point);
            }
        }

        for point in &mapped_previous {
            max_value = max_value.max(point.value);
            if points.previous_max.map_or(true, |max| point.value > max.value) {
                points.previous_max = Some(*point);
            }
            if point.value > 0 && points.previous_min.map_or(true, |min| point.value < min.value) {
                points.previous_min = Some(*point);
            }
        }

        let is_empty_or_zero = current
            .data_points
            .iter()
            .chain(&previous.data_points)
            .all(|point| point.value == 0);

        Self {
            metric,
            granularity,
            current,
            previous,
            mapped_previous,
            max_value,
            significant_points: points,
            is_empty_or_zero,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.current.data_points.is_empty() && self.previous.data_points.is_empty()
    }

    pub fn current_total(&self) -> i64 {
        self.current.total.unwrap_or(0)
    }

    pub fn previous_total(&self) -> i64 {
        self.previous.total.unwrap_or(0)
    }

    pub fn trend(&self) -> Trend {
        Trend::new(self.current_total(), self.previous_total(), self.metric)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SiteMetric;
    use crate::stats::trend::TrendDirection;
    use chrono::{DateTime, Duration, Utc};

    fn day(n: i64) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-05-01T00:00:00Z").unwrap().with_timezone(&Utc)
            + Duration::days(n)
    }

    fn period(values: &[i64], first_day: i64) -> PeriodData {
        let data_points: Vec<DataPoint> = values
            .iter()
            .enumerate()
            .map(|(i, v)| DataPoint::new(day(first_day + i as i64), *v))
            .collect();
        let total = DataPoint::total_value(&data_points, SiteMetric::Views);
        PeriodData { data_points, total }
    }

    #[test]
    fn test_max_and_significant_points() {
        let current = period(&[0, 40, 10, 25], 7);
        let previous = period(&[60, 0, 5, 30], 0);
        let mapped = DataPoint::align_previous(&current.data_points, &previous.data_points);

        let chart = ChartData::new(SiteMetric::Views, Granularity::Day, current, previous, mapped);

        assert_eq!(chart.max_value, 60);
        let points = chart.significant_points;
        assert_eq!(points.current_max, Some(DataPoint::new(day(8), 40)));
        assert_eq!(points.current_min, Some(DataPoint::new(day(9), 10)));
        assert_eq!(points.previous_max, Some(DataPoint::new(day(7), 60)));
        assert_eq!(points.previous_min, Some(DataPoint::new(day(9), 5)));
        assert!(!chart.is_empty_or_zero);
    }

    #[test]
    fn test_all_zero() {
        let chart = ChartData::new(
            SiteMetric::Views,
            Granularity::Day,
            period(&[0, 0], 7),
            period(&[0, 0], 0),
            Vec::new(),
        );
        assert!(chart.is_empty_or_zero);
        assert!(!chart.is_empty());
        assert_eq!(chart.max_value, 0);
        assert_eq!(chart.significant_points.current_max, None);
        assert_eq!(chart.significant_points.current_min, None);
    }

    #[test]
    fn test_trend_uses_totals() {
        let chart = ChartData::new(
            SiteMetric::Views,
            Granularity::Day,
            period(&[10, 20], 7),
            period(&[5, 5], 0),
            Vec::new(),
        );
        let trend = chart.trend();
        assert_eq!(trend.current, 30);
        assert_eq!(trend.previous, 10);
        assert_eq!(trend.direction(), TrendDirection::Up);
    }

    #[test]
    fn test_empty_periods() {
        let chart = ChartData::new(
            SiteMetric::Views,
            Granularity::Day,
            PeriodData::default(),
            PeriodData::default(),
            Vec::new(),
        );
        assert!(chart.is_empty());
        assert!(chart.is_empty_or_zero);
        assert_eq!(chart.trend().percentage(), None);
    }
}
