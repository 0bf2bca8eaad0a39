use serde::Serialize;

use crate::models::MetricType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TrendDirection {
    Up,
    Down,
    Flat,
}

/// Whether a change is good news for the metric. Growth in views is
/// positive, growth in bounce rate is negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TrendSentiment {
    Positive,
    Negative,
    Neutral,
}

impl TrendSentiment {
    pub fn reversed(self) -> Self {
        match self {
            Self::Positive => Self::Negative,
            Self::Negative => Self::Positive,
            Self::Neutral => Self::Neutral,
        }
    }
}

/// Change between the previous and current value of one metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trend {
    pub current: i64,
    pub previous: i64,
    pub higher_is_better: bool,
}

impl Trend {
    pub fn new<M: MetricType>(current: i64, previous: i64, metric: M) -> Self {
        Self {
            current,
            previous,
            higher_is_better: metric.is_higher_value_better(),
        }
    }

    /// `+` for no change as well.
    pub fn sign(&self) -> char {
        if self.current >= self.previous {
            '+'
        } else {
            '-'
        }
    }

    pub fn direction(&self) -> TrendDirection {
        match self.current.cmp(&self.previous) {
            std::cmp::Ordering::Greater => TrendDirection::Up,
            std::cmp::Ordering::Less => TrendDirection::Down,
            std::cmp::Ordering::Equal => TrendDirection::Flat,
        }
    }

    pub fn sentiment(&self) -> TrendSentiment {
        let sentiment = match self.direction() {
            TrendDirection::Flat => return TrendSentiment::Neutral,
            TrendDirection::Up => TrendSentiment::Positive,
            TrendDirection::Down => TrendSentiment::Negative,
        };
        if self.higher_is_better {
            sentiment
        } else {
            sentiment.reversed()
        }
    }

    /// Absolute difference, without sign.
    pub fn change(&self) -> i64 {
        self.current.abs_diff(self.previous).try_into().unwrap_or(i64::MAX)
    }

    /// Relative change as a fraction (0.5 is 50%). `None` when the previous
    /// value is zero.
    pub fn percentage(&self) -> Option<f64> {
        if self.previous == 0 {
            return None;
        }
        Some(self.current.abs_diff(self.previous) as f64 / self.previous.unsigned_abs() as f64)
    }
}
