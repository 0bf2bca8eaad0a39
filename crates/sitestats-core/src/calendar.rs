//! Calendar and time zone context
//!
//! Every bucket boundary is computed in the site's time zone, which callers
//! pass in explicitly through [`StatsCalendar`]. Nothing in here reads the
//! system clock or the machine's local zone.

use chrono::{
    DateTime, Datelike, Duration, LocalResult, Months, NaiveDate, NaiveDateTime, NaiveTime,
    TimeZone, Timelike, Utc, Weekday,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::constants::MIN_NAVIGABLE_YEAR;
use crate::error::StatsError;
use crate::models::Granularity;

/// Longest DST gap we step over when a local time does not exist.
const MAX_GAP_MINUTES: i64 = 180;
const GAP_PROBE_MINUTES: i64 = 15;

// =============================================================================
// DateInterval
// =============================================================================

/// Half-open interval `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Like [`DateInterval::new`] but rejects an end before the start.
    pub fn try_new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, StatsError> {
        if end < start {
            return Err(StatsError::InvalidInterval {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComparisonPeriod {
    #[default]
    PrecedingPeriod,
    SamePeriodLastYear,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavigationDirection {
    Backward,
    Forward,
}

// =============================================================================
// StatsCalendar
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatsCalendar {
    time_zone: Tz,
    first_weekday: Weekday,
}

impl Default for StatsCalendar {
    fn default() -> Self {
        Self::utc()
    }
}

impl StatsCalendar {
    pub fn new(time_zone: Tz) -> Self {
        Self {
            time_zone,
            first_weekday: Weekday::Mon,
        }
    }

    pub fn utc() -> Self {
        Self::new(Tz::UTC)
    }

    pub fn with_first_weekday(mut self, first_weekday: Weekday) -> Self {
        self.first_weekday = first_weekday;
        self
    }

    pub fn time_zone(&self) -> Tz {
        self.time_zone
    }

    pub fn first_weekday(&self) -> Weekday {
        self.first_weekday
    }

    fn local(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant.with_timezone(&self.time_zone).naive_local()
    }

    /// Map a wall-clock time back to an instant. Ambiguous times (DST fall
    /// back) resolve to the earlier instant; times inside a DST gap resolve
    /// to the first valid time after it.
    fn resolve(&self, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        match self.time_zone.from_local_datetime(&local) {
            LocalResult::Single(t) => Some(t.with_timezone(&Utc)),
            LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
            LocalResult::None => (1..=MAX_GAP_MINUTES / GAP_PROBE_MINUTES)
                .filter_map(|step| local.checked_add_signed(Duration::minutes(step * GAP_PROBE_MINUTES)))
                .find_map(|probe| self.time_zone.from_local_datetime(&probe).earliest())
                .map(|t| t.with_timezone(&Utc)),
        }
    }

    /// Local calendar year of an instant.
    pub fn year(&self, instant: DateTime<Utc>) -> i32 {
        self.local(instant).year()
    }

    /// Start of the `granularity` unit containing `instant`.
    pub fn start_of(&self, instant: DateTime<Utc>, granularity: Granularity) -> Option<DateTime<Utc>> {
        let local = self.local(instant);
        let date = local.date();

        let truncated = match granularity {
            // Subtracting the local minutes keeps the repeated hour of a DST
            // fall back distinct from the first one.
            Granularity::Hour => {
                let into_hour = Duration::minutes(local.minute() as i64)
                    + Duration::seconds(local.second() as i64)
                    + Duration::nanoseconds(local.nanosecond() as i64);
                return instant.checked_sub_signed(into_hour);
            }
            Granularity::Day => date,
            Granularity::Week => {
                let offset = (7 + date.weekday().num_days_from_monday()
                    - self.first_weekday.num_days_from_monday())
                    % 7;
                date.checked_sub_signed(Duration::days(offset as i64))?
            }
            Granularity::Month => date.with_day(1)?,
            Granularity::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1)?,
        };

        self.resolve(truncated.and_time(NaiveTime::MIN))
    }

    /// Move `value` units forward (or backward when negative). Hours are
    /// absolute; larger units move the local wall-clock time and clamp to
    /// the end of shorter months.
    pub fn add(&self, instant: DateTime<Utc>, granularity: Granularity, value: i32) -> Option<DateTime<Utc>> {
        let value = value as i64;
        match granularity {
            Granularity::Hour => instant.checked_add_signed(Duration::hours(value)),
            Granularity::Day => self.add_local(instant, |local| {
                local.checked_add_signed(Duration::days(value))
            }),
            Granularity::Week => self.add_local(instant, |local| {
                local.checked_add_signed(Duration::weeks(value))
            }),
            Granularity::Month => self.add_local(instant, |local| add_months(local, value)),
            Granularity::Year => self.add_local(instant, |local| add_months(local, value * 12)),
        }
    }

    fn add_local<F>(&self, instant: DateTime<Utc>, shift: F) -> Option<DateTime<Utc>>
    where
        F: FnOnce(NaiveDateTime) -> Option<NaiveDateTime>,
    {
        self.resolve(shift(self.local(instant))?)
    }

    /// Number of whole `unit`s between the interval's bounds, never less than 1.
    fn whole_units(&self, interval: &DateInterval, unit: Granularity) -> i32 {
        let start = self.local(interval.start);
        let end = self.local(interval.end);

        let units = match unit {
            Granularity::Hour => interval.duration().num_hours(),
            Granularity::Day => (end - start).num_days(),
            Granularity::Week => (end - start).num_days() / 7,
            Granularity::Month => whole_months(start, end),
            Granularity::Year => whole_months(start, end) / 12,
        };

        units.clamp(1, i32::MAX as i64) as i32
    }

    /// Shift an interval by its own length measured in whole `unit`s.
    pub fn navigate(
        &self,
        interval: &DateInterval,
        direction: NavigationDirection,
        unit: Granularity,
    ) -> DateInterval {
        let offset = self.whole_units(interval, unit);
        let offset = match direction {
            NavigationDirection::Forward => offset,
            NavigationDirection::Backward => -offset,
        };

        match (
            self.add(interval.start, unit, offset),
            self.add(interval.end, unit, offset),
        ) {
            (Some(start), Some(end)) => DateInterval::new(start, end),
            _ => {
                tracing::warn!(?interval, %unit, offset, "Failed to navigate interval");
                *interval
            }
        }
    }

    /// Whether a caller may move the interval in `direction` without leaving
    /// the range stats exist for.
    pub fn can_navigate(
        &self,
        interval: &DateInterval,
        direction: NavigationDirection,
        now: DateTime<Utc>,
    ) -> bool {
        match direction {
            NavigationDirection::Backward => self.year(interval.start) > MIN_NAVIGABLE_YEAR,
            NavigationDirection::Forward => {
                let end_day = self.start_of(interval.end, Granularity::Day);
                let today = self.start_of(now, Granularity::Day);
                matches!((end_day, today), (Some(end_day), Some(today)) if end_day <= today)
            }
        }
    }

    /// Interval the current one is compared against for trends.
    pub fn comparison_interval(
        &self,
        interval: &DateInterval,
        period: ComparisonPeriod,
        unit: Granularity,
    ) -> DateInterval {
        match period {
            ComparisonPeriod::PrecedingPeriod => {
                self.navigate(interval, NavigationDirection::Backward, unit)
            }
            ComparisonPeriod::SamePeriodLastYear => match (
                self.add(interval.start, Granularity::Year, -1),
                self.add(interval.end, Granularity::Year, -1),
            ) {
                (Some(start), Some(end)) => DateInterval::new(start, end),
                _ => *interval,
            },
        }
    }
}

fn add_months(local: NaiveDateTime, months: i64) -> Option<NaiveDateTime> {
    let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        local.checked_add_months(magnitude)
    } else {
        local.checked_sub_months(magnitude)
    }
}

fn whole_months(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    let mut months = (end.year() as i64 - start.year() as i64) * 12
        + (end.month() as i64 - start.month() as i64);
    if months > 0 && add_months(start, months).is_some_and(|shifted| shifted > end) {
        months -= 1;
    }
    months
}

impl std::str::FromStr for StatsCalendar {
    type Err = StatsError;

    /// Parse an IANA zone name such as `"America/New_York"`.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        name.parse::<Tz>()
            .map(Self::new)
            .map_err(|_| StatsError::InvalidTimeZone {
                name: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value).unwrap().into()
    }

    fn interval(start: &str, end: &str) -> DateInterval {
        DateInterval::new(date(start), date(end))
    }

    #[test]
    fn test_start_of_units_in_utc() {
        let calendar = StatsCalendar::utc();
        let instant = date("2025-01-15T14:37:12Z"); // Wednesday

        assert_eq!(calendar.start_of(instant, Granularity::Hour), Some(date("2025-01-15T14:00:00Z")));
        assert_eq!(calendar.start_of(instant, Granularity::Day), Some(date("2025-01-15T00:00:00Z")));
        assert_eq!(calendar.start_of(instant, Granularity::Week), Some(date("2025-01-13T00:00:00Z")));
        assert_eq!(calendar.start_of(instant, Granularity::Month), Some(date("2025-01-01T00:00:00Z")));
        assert_eq!(calendar.start_of(instant, Granularity::Year), Some(date("2025-01-01T00:00:00Z")));
    }

    #[test]
    fn test_week_respects_first_weekday() {
        let calendar = StatsCalendar::utc().with_first_weekday(Weekday::Sun);
        let wednesday = date("2025-01-15T10:00:00Z");
        assert_eq!(calendar.start_of(wednesday, Granularity::Week), Some(date("2025-01-12T00:00:00Z")));

        let sunday = date("2025-01-12T23:00:00Z");
        assert_eq!(calendar.start_of(sunday, Granularity::Week), Some(date("2025-01-12T00:00:00Z")));
    }

    #[test]
    fn test_day_boundary_follows_time_zone() {
        let calendar: StatsCalendar = "America/New_York".parse().unwrap();
        // 03:00 UTC is 22:00 the previous evening in New York (EST, -05:00)
        let instant = date("2025-01-16T03:00:00Z");
        assert_eq!(calendar.start_of(instant, Granularity::Day), Some(date("2025-01-15T05:00:00Z")));
    }

    #[test]
    fn test_day_start_inside_dst_gap_resolves_after_gap() {
        // Santiago springs forward at local midnight, so 2024-09-08 00:00 does not exist
        let calendar: StatsCalendar = "America/Santiago".parse().unwrap();
        let instant = date("2024-09-08T15:00:00Z");
        let start = calendar.start_of(instant, Granularity::Day).unwrap();
        assert_eq!(start, date("2024-09-08T01:00:00-03:00"));
    }

    #[test]
    fn test_add_days_keeps_wall_clock_across_dst() {
        let calendar: StatsCalendar = "America/New_York".parse().unwrap();
        let before = date("2025-03-08T05:00:00Z"); // midnight EST
        let after = calendar.add(before, Granularity::Day, 1).unwrap();
        assert_eq!(after, date("2025-03-09T05:00:00Z"));
        let next = calendar.add(after, Granularity::Day, 1).unwrap();
        // Midnight EDT is 04:00 UTC
        assert_eq!(next, date("2025-03-10T04:00:00Z"));
    }

    #[test]
    fn test_add_months_clamps_to_month_end() {
        let calendar = StatsCalendar::utc();
        let jan_31 = date("2025-01-31T00:00:00Z");
        assert_eq!(calendar.add(jan_31, Granularity::Month, 1), Some(date("2025-02-28T00:00:00Z")));
        assert_eq!(calendar.add(jan_31, Granularity::Year, -1), Some(date("2024-01-31T00:00:00Z")));
    }

    #[test]
    fn test_preceding_period() {
        let calendar = StatsCalendar::utc();

        let day = interval("2025-01-15T00:00:00Z", "2025-01-16T00:00:00Z");
        assert_eq!(
            calendar.comparison_interval(&day, ComparisonPeriod::PrecedingPeriod, Granularity::Day),
            interval("2025-01-14T00:00:00Z", "2025-01-15T00:00:00Z")
        );

        let week = interval("2025-01-12T00:00:00Z", "2025-01-19T00:00:00Z");
        assert_eq!(
            calendar.comparison_interval(&week, ComparisonPeriod::PrecedingPeriod, Granularity::Week),
            interval("2025-01-05T00:00:00Z", "2025-01-12T00:00:00Z")
        );

        let month = interval("2025-02-01T00:00:00Z", "2025-03-01T00:00:00Z");
        assert_eq!(
            calendar.comparison_interval(&month, ComparisonPeriod::PrecedingPeriod, Granularity::Month),
            interval("2025-01-01T00:00:00Z", "2025-02-01T00:00:00Z")
        );

        let custom = interval("2025-01-08T00:00:00Z", "2025-01-15T00:00:00Z");
        assert_eq!(
            calendar.comparison_interval(&custom, ComparisonPeriod::PrecedingPeriod, Granularity::Day),
            interval("2025-01-01T00:00:00Z", "2025-01-08T00:00:00Z")
        );
    }

    #[test]
    fn test_same_period_last_year() {
        let calendar = StatsCalendar::utc();
        let month = interval("2025-02-01T00:00:00Z", "2025-03-01T00:00:00Z");
        assert_eq!(
            calendar.comparison_interval(&month, ComparisonPeriod::SamePeriodLastYear, Granularity::Month),
            interval("2024-02-01T00:00:00Z", "2024-03-01T00:00:00Z")
        );
    }

    #[test]
    fn test_can_navigate() {
        let calendar = StatsCalendar::utc();
        let now = date("2025-01-20T12:00:00Z");

        let past = interval("2025-01-10T00:00:00Z", "2025-01-17T00:00:00Z");
        assert!(calendar.can_navigate(&past, NavigationDirection::Forward, now));
        assert!(calendar.can_navigate(&past, NavigationDirection::Backward, now));

        let current = interval("2025-01-20T00:00:00Z", "2025-01-21T00:00:00Z");
        assert!(!calendar.can_navigate(&current, NavigationDirection::Forward, now));

        let ancient = interval("2000-03-01T00:00:00Z", "2000-04-01T00:00:00Z");
        assert!(!calendar.can_navigate(&ancient, NavigationDirection::Backward, now));
    }

    #[test]
    fn test_interval_validation() {
        let start = date("2025-01-02T00:00:00Z");
        let end = date("2025-01-01T00:00:00Z");
        assert!(matches!(
            DateInterval::try_new(start, end),
            Err(StatsError::InvalidInterval { .. })
        ));
        assert!(DateInterval::new(start, start).is_empty());
    }

    #[test]
    fn test_unknown_time_zone() {
        assert!(matches!(
            "Mars/Olympus_Mons".parse::<StatsCalendar>(),
            Err(StatsError::InvalidTimeZone { .. })
        ));
    }
}
