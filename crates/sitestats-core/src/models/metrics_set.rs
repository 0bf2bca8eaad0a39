use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use super::metric::{MetricType, SiteMetric, WordAdsMetric};

/// Sparse row of optional values, one slot per metric of `M`.
///
/// `None` means "not measured for this row" and is distinct from `Some(0)`.
#[derive(Clone, PartialEq, Eq)]
pub struct MetricsSet<M: MetricType> {
    values: Vec<Option<i64>>,
    _metric: PhantomData<M>,
}

pub type SiteMetricsSet = MetricsSet<SiteMetric>;
pub type WordAdsMetricsSet = MetricsSet<WordAdsMetric>;

impl<M: MetricType> MetricsSet<M> {
    pub fn new() -> Self {
        Self {
            values: vec![None; M::ALL.len()],
            _metric: PhantomData,
        }
    }

    /// Builder-style setter for a single slot.
    pub fn with(mut self, metric: M, value: i64) -> Self {
        self.set(metric, Some(value));
        self
    }

    pub fn get(&self, metric: M) -> Option<i64> {
        self.values.get(metric.slot()).copied().flatten()
    }

    pub fn set(&mut self, metric: M, value: Option<i64>) {
        if let Some(slot) = self.values.get_mut(metric.slot()) {
            *slot = value;
        }
    }

    /// Present values in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (M, i64)> + '_ {
        M::ALL
            .iter()
            .copied()
            .filter_map(|metric| self.get(metric).map(|value| (metric, value)))
    }

    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }
}

impl<M: MetricType> Default for MetricsSet<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: MetricType> fmt::Debug for MetricsSet<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(metric, value)| (metric.key(), value)))
            .finish()
    }
}

impl<M: MetricType> Serialize for MetricsSet<M> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let present: Vec<(M, i64)> = self.iter().collect();
        let mut map = serializer.serialize_map(Some(present.len()))?;
        for (metric, value) in present {
            map.serialize_entry(metric.key(), &value)?;
        }
        map.end()
    }
}

impl<'de, M: MetricType> Deserialize<'de> for MetricsSet<M> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, Option<i64>>::deserialize(deserializer)?;
        let mut set = Self::new();
        for (key, value) in raw {
            let metric = M::from_key(&key)
                .ok_or_else(|| de::Error::custom(format!("unknown metric key: {}", key)))?;
            set.set(metric, value);
        }
        Ok(set)
    }
}
