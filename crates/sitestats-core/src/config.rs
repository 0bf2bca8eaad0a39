use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::calendar::StatsCalendar;
use crate::constants::{DEFAULT_TIME_ZONE, DEFAULT_TOP_LIST_LIMIT};
use crate::error::StatsError;

/// Site-level settings that every aggregation depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatsConfig {
    /// IANA time zone name, e.g. `"Europe/Paris"`
    pub time_zone: String,

    /// First day of a week bucket
    pub first_weekday: Weekday,

    /// Cap for merged top lists (`null` keeps every item)
    pub top_list_limit: Option<usize>,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            time_zone: DEFAULT_TIME_ZONE.to_string(),
            first_weekday: Weekday::Mon,
            top_list_limit: Some(DEFAULT_TOP_LIST_LIMIT),
        }
    }
}

impl StatsConfig {
    pub fn calendar(&self) -> Result<StatsCalendar, StatsError> {
        let calendar: StatsCalendar = self.time_zone.parse()?;
        Ok(calendar.with_first_weekday(self.first_weekday))
    }
}
