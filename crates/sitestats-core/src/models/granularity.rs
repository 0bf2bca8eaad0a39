use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::calendar::DateInterval;
use crate::constants::{DAILY_MAX_DAYS, HOURLY_MAX_DAYS, MONTHLY_MAX_DAYS, SECONDS_PER_DAY};
use crate::error::StatsError;

/// Calendar unit used both as a bucket width and as the step between
/// consecutive buckets. Ordered from finest to coarsest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl Granularity {
    pub const ALL: [Granularity; 5] = [
        Self::Hour,
        Self::Day,
        Self::Week,
        Self::Month,
        Self::Year,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    /// Granularity a chart should use for an interval of this length.
    ///
    /// The span is rounded to whole days so that 23/25 hour days around DST
    /// transitions still count as a single day.
    pub fn preferred_for(interval: &DateInterval) -> Self {
        let seconds = interval.duration().num_seconds();
        let days = (seconds + SECONDS_PER_DAY / 2) / SECONDS_PER_DAY;

        if days <= HOURLY_MAX_DAYS {
            Self::Hour
        } else if days <= DAILY_MAX_DAYS {
            Self::Day
        } else if days <= MONTHLY_MAX_DAYS {
            Self::Month
        } else {
            Self::Year
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Granularity {
    type Err = StatsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|g| g.label().eq_ignore_ascii_case(value))
            .ok_or_else(|| StatsError::UnknownGranularity {
                value: value.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn interval(start: &str, end: &str) -> DateInterval {
        let start: DateTime<Utc> = DateTime::parse_from_rfc3339(start).unwrap().into();
        let end: DateTime<Utc> = DateTime::parse_from_rfc3339(end).unwrap().into();
        DateInterval::new(start, end)
    }

    #[test]
    fn test_single_day_prefers_hours() {
        let day = interval("2024-01-01T00:00:00-03:00", "2024-01-02T00:00:00-03:00");
        assert_eq!(Granularity::preferred_for(&day), Granularity::Hour);
    }

    #[test]
    fn test_day_boundaries() {
        let two_days = interval("2024-01-01T00:00:00-03:00", "2024-01-03T00:00:00-03:00");
        assert_eq!(Granularity::preferred_for(&two_days), Granularity::Day);

        let ninety_days = interval("2024-01-01T00:00:00-03:00", "2024-03-31T00:00:00-03:00");
        assert_eq!(Granularity::preferred_for(&ninety_days), Granularity::Day);

        let ninety_one_days = interval("2024-01-01T00:00:00-03:00", "2024-04-01T00:00:00-03:00");
        assert_eq!(Granularity::preferred_for(&ninety_one_days), Granularity::Month);
    }

    #[test]
    fn test_multi_year_ranges() {
        let two_years = interval("2024-01-01T00:00:00-03:00", "2025-12-31T00:00:00-03:00");
        assert_eq!(Granularity::preferred_for(&two_years), Granularity::Month);

        let three_years = interval("2024-01-01T00:00:00-03:00", "2027-01-02T00:00:00-03:00");
        assert_eq!(Granularity::preferred_for(&three_years), Granularity::Month);

        let five_years = interval("2024-01-01T00:00:00-03:00", "2029-01-02T00:00:00-03:00");
        assert_eq!(Granularity::preferred_for(&five_years), Granularity::Year);
    }

    #[test]
    fn test_parse_and_order() {
        assert_eq!("Week".parse::<Granularity>().unwrap(), Granularity::Week);
        assert!("fortnight".parse::<Granularity>().is_err());
        assert!(Granularity::Hour < Granularity::Day);
        assert_eq!(Granularity::Day.max(Granularity::Month), Granularity::Month);
    }
}
