use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use crate::error::StatsError;

/// How multiple observations of one metric collapse into one value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationStrategy {
    Sum,
    /// Integer mean; the remainder is truncated.
    Average,
}

impl AggregationStrategy {
    /// Reduce a running `(sum, count)` pair. `None` when nothing was counted.
    pub fn reduce(&self, sum: i64, count: i64) -> Option<i64> {
        match self {
            Self::Sum => Some(sum),
            Self::Average if count > 0 => Some(sum / count),
            Self::Average => None,
        }
    }
}

/// Static description of a metric.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSpec {
    pub key: &'static str,
    pub aggregation_strategy: AggregationStrategy,
    pub higher_is_better: bool,
}

/// A closed set of metrics that share one record layout.
pub trait MetricType: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    /// Every metric in slot order.
    const ALL: &'static [Self];

    fn key(&self) -> &'static str;

    fn aggregation_strategy(&self) -> AggregationStrategy;

    fn is_higher_value_better(&self) -> bool {
        true
    }

    /// Position of this metric in a [`MetricsSet`](super::MetricsSet).
    fn slot(&self) -> usize {
        Self::ALL
            .iter()
            .position(|m| m == self)
            .unwrap_or_default()
    }

    fn spec(&self) -> MetricSpec {
        MetricSpec {
            key: self.key(),
            aggregation_strategy: self.aggregation_strategy(),
            higher_is_better: self.is_higher_value_better(),
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| m.key() == key)
    }
}

// =============================================================================
// Site metrics
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SiteMetric {
    Views,
    Visitors,
    Likes,
    Comments,
    Posts,
    TimeOnSite,
    BounceRate,
    Downloads,
}

impl MetricType for SiteMetric {
    const ALL: &'static [Self] = &[
        Self::Views,
        Self::Visitors,
        Self::Likes,
        Self::Comments,
        Self::Posts,
        Self::TimeOnSite,
        Self::BounceRate,
        Self::Downloads,
    ];

    fn key(&self) -> &'static str {
        match self {
            Self::Views => "views",
            Self::Visitors => "visitors",
            Self::Likes => "likes",
            Self::Comments => "comments",
            Self::Posts => "posts",
            Self::TimeOnSite => "timeOnSite",
            Self::BounceRate => "bounceRate",
            Self::Downloads => "downloads",
        }
    }

    fn aggregation_strategy(&self) -> AggregationStrategy {
        match self {
            Self::TimeOnSite | Self::BounceRate => AggregationStrategy::Average,
            _ => AggregationStrategy::Sum,
        }
    }

    fn is_higher_value_better(&self) -> bool {
        !matches!(self, Self::BounceRate)
    }

    fn slot(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for SiteMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SiteMetric {
    type Err = StatsError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        Self::from_key(key).ok_or_else(|| StatsError::UnknownMetric {
            key: key.to_string(),
        })
    }
}

// =============================================================================
// WordAds metrics
// =============================================================================

/// Ad revenue metrics. Monetary values are stored in cents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WordAdsMetric {
    Impressions,
    Cpm,
    Revenue,
}

impl MetricType for WordAdsMetric {
    const ALL: &'static [Self] = &[Self::Impressions, Self::Cpm, Self::Revenue];

    fn key(&self) -> &'static str {
        match self {
            Self::Impressions => "impressions",
            Self::Cpm => "cpm",
            Self::Revenue => "revenue",
        }
    }

    fn aggregation_strategy(&self) -> AggregationStrategy {
        match self {
            Self::Cpm => AggregationStrategy::Average,
            Self::Impressions | Self::Revenue => AggregationStrategy::Sum,
        }
    }

    fn slot(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for WordAdsMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for WordAdsMetric {
    type Err = StatsError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        Self::from_key(key).ok_or_else(|| StatsError::UnknownMetric {
            key: key.to_string(),
        })
    }
}
