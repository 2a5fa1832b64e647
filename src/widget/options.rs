//! Typed pie chart options.

use serde::{Deserialize, Serialize};

use crate::db::{AggregateFunction, HostId, ItemId};
use crate::timeperiod::TimePeriod;

/// Role of an explicitly selected item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemRole {
    #[default]
    Normal,
    /// The item's value is the whole of the pie.
    Total,
}

/// Aggregation across the items of one data set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetAggregation {
    /// Every item is a sector of its own.
    #[default]
    None,
    Min,
    Max,
    Avg,
    Count,
    Sum,
}

impl DatasetAggregation {
    pub fn label(self) -> &'static str {
        match self {
            DatasetAggregation::None => "none",
            DatasetAggregation::Min => "min",
            DatasetAggregation::Max => "max",
            DatasetAggregation::Avg => "avg",
            DatasetAggregation::Count => "count",
            DatasetAggregation::Sum => "sum",
        }
    }
}

/// How a data set selects its items.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSetKind {
    /// Explicit items with parallel color and role palettes.
    Items {
        item_ids: Vec<ItemId>,
        colors: Vec<String>,
        types: Vec<ItemRole>,
    },
    /// Host and item name patterns sharing one base color.
    Patterns {
        hosts: Vec<String>,
        items: Vec<String>,
        color: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    pub kind: DataSetKind,
    pub aggregate_function: AggregateFunction,
    pub dataset_aggregation: DatasetAggregation,
    /// Sector name for aggregated data sets, `Data set #N` when empty.
    pub label: String,
}

/// Requested data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// Pick history or trends per item from its storage periods.
    #[default]
    Auto,
    History,
    Trends,
}

/// Settings for folding small sectors into "Others".
#[derive(Debug, Clone, PartialEq)]
pub struct MergeConfig {
    /// Sectors below this percent of the total are merged.
    pub percent: f64,
    pub color: String,
}

/// Everything one pie chart computation needs.
#[derive(Debug, Clone, PartialEq)]
pub struct PieChartOptions {
    pub data_sets: Vec<DataSet>,
    pub data_source: DataSource,
    pub time_period: TimePeriod,
    /// Resolve items on this template instead of the configured hosts.
    pub templateid: Option<HostId>,
    pub merge: Option<MergeConfig>,
    /// Decimal places of the total value, `None` when the total is not shown.
    pub total_decimals: Option<u32>,
    /// `None` hides units, `Some("")` keeps item units, otherwise overrides them.
    pub units: Option<String>,
    /// Current unix time used for source selection.
    pub now: i64,
}
