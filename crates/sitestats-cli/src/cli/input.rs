use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use sitestats_core::{DataPoint, TopListItem, TopListItemType};

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse input file: {}", path.display()))
}

/// `[{"date": "...", "value": 1}, ...]`
pub fn read_points(path: &Path) -> Result<Vec<DataPoint>> {
    read_json(path)
}

/// `{"2025-01-01T00:00:00Z": [item, ...], ...}`, keeping only items of
/// `item_type`.
pub fn read_snapshots(
    path: &Path,
    item_type: TopListItemType,
) -> Result<BTreeMap<DateTime<Utc>, Vec<TopListItem>>> {
    let mut snapshots: BTreeMap<DateTime<Utc>, Vec<TopListItem>> = read_json(path)?;
    for items in snapshots.values_mut() {
        items.retain(|item| item.item_type() == item_type);
    }
    Ok(snapshots)
}
