//! Catalog and history model types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub type ItemId = u64;
pub type HostId = u64;

/// Type of information an item collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Float,
    Str,
    Log,
    Uint64,
    Text,
    Binary,
}

impl ValueType {
    pub const NUMERIC: [ValueType; 2] = [ValueType::Uint64, ValueType::Float];

    pub fn is_numeric(self) -> bool {
        Self::NUMERIC.contains(&self)
    }
}

/// A host or template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Host {
    pub hostid: HostId,
    pub name: String,
    /// Templates are never returned by host name searches.
    #[serde(default)]
    pub template: bool,
    /// User macros defined on the host, keyed by the full macro text (`{$NAME}`).
    #[serde(default)]
    pub macros: BTreeMap<String, String>,
}

/// An item as stored in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub itemid: ItemId,
    pub hostid: HostId,
    pub name: String,
    pub key: String,
    /// History storage period, possibly a user macro (`90d`, `{$HISTORY}`).
    #[serde(default = "default_history")]
    pub history: String,
    /// Trend storage period, `0` disables trends.
    #[serde(default = "default_trends")]
    pub trends: String,
    #[serde(default)]
    pub units: String,
    pub value_type: ValueType,
}

fn default_history() -> String {
    "90d".to_string()
}

fn default_trends() -> String {
    "365d".to_string()
}

/// An item joined with the name of its host, as returned by catalog queries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemInfo {
    pub itemid: ItemId,
    pub hostid: HostId,
    pub host_name: String,
    pub name: String,
    pub key: String,
    pub history: String,
    pub trends: String,
    pub units: String,
    pub value_type: ValueType,
}

/// A single history value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRow {
    pub itemid: ItemId,
    pub clock: i64,
    pub value: f64,
}

/// An hourly trend record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendRow {
    pub itemid: ItemId,
    pub clock: i64,
    pub num: u64,
    pub value_min: f64,
    pub value_avg: f64,
    pub value_max: f64,
}

/// Storage tier values are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    History,
    Trends,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Source::History => write!(f, "history"),
            Source::Trends => write!(f, "trends"),
        }
    }
}

/// Item reference handed to the history service.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRef {
    pub itemid: ItemId,
    pub value_type: ValueType,
    pub source: Source,
}

/// Function applied to the values of one item inside an aggregation interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateFunction {
    Min,
    Max,
    Avg,
    Count,
    Sum,
    First,
    #[default]
    Last,
}

impl AggregateFunction {
    pub fn label(self) -> &'static str {
        match self {
            AggregateFunction::Min => "min",
            AggregateFunction::Max => "max",
            AggregateFunction::Avg => "avg",
            AggregateFunction::Count => "count",
            AggregateFunction::Sum => "sum",
            AggregateFunction::First => "first",
            AggregateFunction::Last => "last",
        }
    }
}

/// One aggregated value for an interval starting at `tick`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedPoint {
    pub tick: i64,
    /// Clock of the newest value that went into the point.
    pub clock: i64,
    pub value: f64,
}

/// Aggregation results of one item, ordered by tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedSeries {
    pub itemid: ItemId,
    pub data: Vec<AggregatedPoint>,
}
