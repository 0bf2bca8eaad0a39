//! Shared defaults and thresholds
//!
//! Centralized location for values used by both the core and its callers.

/// Time zone used when the configuration does not name one.
pub const DEFAULT_TIME_ZONE: &str = "UTC";

/// Default number of items kept when merging a top list.
pub const DEFAULT_TOP_LIST_LIMIT: usize = 10;

pub const SECONDS_PER_HOUR: i64 = 60 * 60;
pub const SECONDS_PER_DAY: i64 = 24 * SECONDS_PER_HOUR;

// Preferred granularity thresholds (interval span, rounded to whole days)
/// Intervals up to this many days are charted by hour.
pub const HOURLY_MAX_DAYS: i64 = 1;
/// Intervals up to this many days are charted by day.
pub const DAILY_MAX_DAYS: i64 = 90;
/// Intervals up to this many days (about 36 months) are charted by month.
/// Anything longer is charted by year.
pub const MONTHLY_MAX_DAYS: i64 = 1098;

/// Backward navigation stops once the interval starts in this year.
pub const MIN_NAVIGABLE_YEAR: i32 = 2000;
