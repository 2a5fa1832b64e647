//! In-memory catalog and history store.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use super::catalog::*;
use super::models::*;
use super::search::WildcardSearch;
use crate::timeunit::expand_user_macros;

/// Store error types.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("query error: {0}")]
    Query(String),
}

/// Catalog, macros and historical data held in memory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    #[serde(default)]
    pub hosts: Vec<Host>,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub history: Vec<HistoryRow>,
    #[serde(default)]
    pub trends: Vec<TrendRow>,
    /// Global user macros, keyed by the full macro text (`{$NAME}`).
    #[serde(default)]
    pub global_macros: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from a JSON fixture file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DbError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<Self, DbError> {
        let store: Self = serde_json::from_str(data)?;
        tracing::debug!(
            "MemoryStore: loaded {} hosts, {} items, {} history rows, {} trend rows",
            store.hosts.len(),
            store.items.len(),
            store.history.len(),
            store.trends.len()
        );
        Ok(store)
    }

    pub fn add_host(&mut self, host: Host) {
        self.hosts.push(host);
    }

    pub fn add_item(&mut self, item: Item) {
        self.items.push(item);
    }

    pub fn add_history(&mut self, itemid: ItemId, clock: i64, value: f64) {
        self.history.push(HistoryRow { itemid, clock, value });
    }

    pub fn add_trend(&mut self, trend: TrendRow) {
        self.trends.push(trend);
    }

    fn host(&self, hostid: HostId) -> Option<&Host> {
        self.hosts.iter().find(|h| h.hostid == hostid)
    }

    fn item_info(&self, item: &Item) -> ItemInfo {
        ItemInfo {
            itemid: item.itemid,
            hostid: item.hostid,
            host_name: self
                .host(item.hostid)
                .map(|h| h.name.clone())
                .unwrap_or_default(),
            name: item.name.clone(),
            key: item.key.clone(),
            history: item.history.clone(),
            trends: item.trends.clone(),
            units: item.units.clone(),
            value_type: item.value_type,
        }
    }

    /// Samples of one item within `[time_from, time_to]`, oldest first.
    /// History values are treated as trend records with a single value.
    fn samples(&self, item: &ItemRef, time_from: i64, time_to: i64) -> Vec<Sample> {
        let in_range = |clock: i64| clock >= time_from && clock <= time_to;

        let mut samples: Vec<Sample> = match item.source {
            Source::History => self
                .history
                .iter()
                .filter(|r| r.itemid == item.itemid && in_range(r.clock))
                .map(|r| Sample {
                    clock: r.clock,
                    num: 1,
                    min: r.value,
                    avg: r.value,
                    max: r.value,
                })
                .collect(),
            Source::Trends => self
                .trends
                .iter()
                .filter(|r| r.itemid == item.itemid && in_range(r.clock) && r.num > 0)
                .map(|r| Sample {
                    clock: r.clock,
                    num: r.num,
                    min: r.value_min,
                    avg: r.value_avg,
                    max: r.value_max,
                })
                .collect(),
        };

        samples.sort_by_key(|s| s.clock);
        samples
    }
}

#[derive(Debug, Clone, Copy)]
struct Sample {
    clock: i64,
    num: u64,
    min: f64,
    avg: f64,
    max: f64,
}

/// Apply `function` to samples sorted by clock.
fn aggregate_samples(samples: &[Sample], function: AggregateFunction) -> Option<f64> {
    let first = samples.first()?;
    let last = samples.last()?;
    let num: u64 = samples.iter().map(|s| s.num).sum();
    let sum: f64 = samples.iter().map(|s| s.avg * s.num as f64).sum();

    let value = match function {
        AggregateFunction::Min => samples.iter().map(|s| s.min).fold(f64::INFINITY, f64::min),
        AggregateFunction::Max => samples
            .iter()
            .map(|s| s.max)
            .fold(f64::NEG_INFINITY, f64::max),
        AggregateFunction::Avg => sum / num as f64,
        AggregateFunction::Count => num as f64,
        AggregateFunction::Sum => sum,
        AggregateFunction::First => first.avg,
        AggregateFunction::Last => last.avg,
    };

    Some(value)
}

impl ItemCatalog for MemoryStore {
    fn get_items(&self, query: &ItemQuery) -> Result<Vec<ItemInfo>, DbError> {
        let search = query.name_patterns.as_deref().map(WildcardSearch::new);

        let mut items: Vec<ItemInfo> = self
            .items
            .iter()
            .filter(|i| query.itemids.as_ref().map_or(true, |ids| ids.contains(&i.itemid)))
            .filter(|i| query.hostids.as_ref().map_or(true, |ids| ids.contains(&i.hostid)))
            .filter(|i| query.keys.as_ref().map_or(true, |keys| keys.contains(&i.key)))
            .filter(|i| query.value_types.as_ref().map_or(true, |t| t.contains(&i.value_type)))
            .filter(|i| search.as_ref().map_or(true, |s| s.is_match(&i.name)))
            .map(|i| self.item_info(i))
            .collect();

        if query.sort_by_name {
            items.sort_by(|a, b| a.name.cmp(&b.name));
        }

        if let Some(limit) = query.limit {
            items.truncate(limit);
        }

        Ok(items)
    }

    fn get_host_ids(&self, name_patterns: Option<&[String]>) -> Result<Vec<HostId>, DbError> {
        let search = name_patterns.map(WildcardSearch::new);

        Ok(self
            .hosts
            .iter()
            .filter(|h| !h.template)
            .filter(|h| search.as_ref().map_or(true, |s| s.is_match(&h.name)))
            .map(|h| h.hostid)
            .collect())
    }
}

impl MacroResolver for MemoryStore {
    fn resolve_time_unit(&self, hostid: HostId, value: &str) -> String {
        let host = self.host(hostid);

        expand_user_macros(value, |name| {
            host.and_then(|h| h.macros.get(name))
                .or_else(|| self.global_macros.get(name))
                .cloned()
        })
    }
}

impl HistoryService for MemoryStore {
    fn aggregate_by_interval(
        &self,
        items: &[ItemRef],
        time_from: i64,
        time_to: i64,
        function: AggregateFunction,
        interval: i64,
    ) -> Result<Vec<AggregatedSeries>, DbError> {
        if interval < 1 {
            return Err(DbError::Query(format!("invalid aggregation interval {}", interval)));
        }

        // The window is closed, so a sample at `time_to` belongs to the last bucket.
        let last_bucket = (time_to - time_from - 1).max(0) / interval;
        let mut results = Vec::new();

        for item in items {
            let mut buckets: BTreeMap<i64, Vec<Sample>> = BTreeMap::new();
            for sample in self.samples(item, time_from, time_to) {
                let bucket = ((sample.clock - time_from) / interval).min(last_bucket);
                let tick = time_from + bucket * interval;
                buckets.entry(tick).or_default().push(sample);
            }

            let data: Vec<AggregatedPoint> = buckets
                .into_iter()
                .filter_map(|(tick, samples)| {
                    let clock = samples.last()?.clock;
                    aggregate_samples(&samples, function).map(|value| AggregatedPoint {
                        tick,
                        clock,
                        value,
                    })
                })
                .collect();

            if !data.is_empty() {
                results.push(AggregatedSeries {
                    itemid: item.itemid,
                    data,
                });
            }
        }

        Ok(results)
    }
}
