use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::calendar::DateInterval;
use crate::models::{MetricType, RankedItem, TopListItemId};

/// Merge per-day snapshots inside `interval` into one ranked list.
///
/// Items are grouped by identity. The first occurrence supplies every field
/// except `metric`, which becomes the sum over all included days (absent
/// counts as zero). Other metric slots are not re-aggregated. Ties keep the
/// order items were first encountered in, walking days chronologically.
pub fn merge_top_list<T: RankedItem>(
    daily: &BTreeMap<DateTime<Utc>, Vec<T>>,
    interval: &DateInterval,
    metric: T::Metric,
    limit: Option<usize>,
) -> Vec<T> {
    let mut order: Vec<TopListItemId> = Vec::new();
    let mut merged: HashMap<TopListItemId, (T, i64)> = HashMap::new();
    let mut days = 0usize;

    if interval.end < interval.start {
        return Vec::new();
    }

    for items in daily.range(interval.start..interval.end).map(|(_, items)| items) {
        days += 1;
        for item in items {
            let id = item.id();
            let value = item.value(metric).unwrap_or(0);
            match merged.get_mut(&id) {
                Some((_, sum)) => *sum = sum.saturating_add(value),
                None => {
                    order.push(id.clone());
                    merged.insert(id, (item.clone(), value));
                }
            }
        }
    }

    let mut ranked: Vec<T> = order
        .iter()
        .filter_map(|id| merged.remove(id))
        .map(|(mut item, sum)| {
            item.metrics_mut().set(metric, Some(sum));
            item
        })
        .collect();

    // sort_by is stable
    ranked.sort_by(|a, b| b.value(metric).unwrap_or(0).cmp(&a.value(metric).unwrap_or(0)));

    if let Some(limit) = limit {
        ranked.truncate(limit);
    }

    debug!(
        metric = ?metric,
        days,
        unique_items = order.len(),
        returned = ranked.len(),
        "Merged top list"
    );

    ranked
}

/// Summary numbers shown above a ranked list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopListMetrics {
    /// Largest present value; items without one are skipped.
    pub max_value: i64,
    /// Sum with absent values counted as zero.
    pub total: i64,
    pub previous_total: i64,
}

impl TopListMetrics {
    pub fn compute<T: RankedItem>(
        items: &[T],
        previous_items: &HashMap<TopListItemId, T>,
        metric: T::Metric,
    ) -> Self {
        let max_value = items
            .iter()
            .filter_map(|item| item.value(metric))
            .max()
            .unwrap_or(0);
        let total = saturating_total(items.iter(), metric);
        let previous_total = saturating_total(previous_items.values(), metric);

        Self {
            max_value,
            total,
            previous_total,
        }
    }
}

/// A ranked list for one metric together with its previous-period
/// counterparts and summary.
///
/// Fields are read-only so the summary always matches the items it was
/// computed from.
#[derive(Debug, Clone)]
pub struct TopListData<T: RankedItem> {
    metric: T::Metric,
    items: Vec<T>,
    previous_items: HashMap<TopListItemId, T>,
    metrics: TopListMetrics,
}

impl<T: RankedItem> TopListData<T> {
    pub fn new(metric: T::Metric, items: Vec<T>, previous: Vec<T>) -> Self {
        let previous_items = index_by_id(previous);
        let metrics = TopListMetrics::compute(&items, &previous_items, metric);
        Self {
            metric,
            items,
            previous_items,
            metrics,
        }
    }

    pub fn metric(&self) -> T::Metric {
        self.metric
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn previous_items(&self) -> &HashMap<TopListItemId, T> {
        &self.previous_items
    }

    pub fn metrics(&self) -> &TopListMetrics {
        &self.metrics
    }

    /// Previous-period entry for `item`, if that identity was tracked.
    pub fn previous_item(&self, item: &T) -> Option<&T> {
        self.previous_items.get(&item.id())
    }

    /// Switch the ranking metric. Summary numbers are recomputed, not
    /// patched.
    pub fn with_metric(mut self, metric: T::Metric) -> Self {
        self.metric = metric;
        self.metrics = TopListMetrics::compute(&self.items, &self.previous_items, metric);
        self
    }
}

fn saturating_total<'a, T: RankedItem + 'a>(
    items: impl Iterator<Item = &'a T>,
    metric: T::Metric,
) -> i64 {
    items.fold(0i64, |sum, item| sum.saturating_add(item.value(metric).unwrap_or(0)))
}

/// Later duplicates of an identity replace earlier ones.
pub fn index_by_id<T: RankedItem>(items: Vec<T>) -> HashMap<TopListItemId, T> {
    items.into_iter().map(|item| (item.id(), item)).collect()
}
