//! Working record carried through the pipeline stages.

use crate::db::{AggregateFunction, ItemInfo, ItemRef, Source};

use super::options::{DatasetAggregation, ItemRole};

/// One resolved item and everything the later stages attach to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub item: ItemInfo,
    /// Index of the originating data set.
    pub data_set: usize,
    pub color: String,
    pub role: ItemRole,
    pub aggregate_function: AggregateFunction,
    pub dataset_aggregation: DatasetAggregation,
    /// Storage periods in seconds, set by source selection.
    pub history_seconds: i64,
    pub trends_seconds: i64,
    pub source: Source,
    /// Sector name, set by aggregation.
    pub name: String,
    /// Items aggregated into this metric. Only aggregated data sets hold more than one.
    pub items: Vec<ItemRef>,
    pub value: Option<f64>,
}

impl Metric {
    pub fn new(
        item: ItemInfo,
        data_set: usize,
        color: String,
        role: ItemRole,
        aggregate_function: AggregateFunction,
        dataset_aggregation: DatasetAggregation,
    ) -> Self {
        Self {
            item,
            data_set,
            color,
            role,
            aggregate_function,
            dataset_aggregation,
            history_seconds: 0,
            trends_seconds: 0,
            source: Source::History,
            name: String::new(),
            items: Vec::new(),
            value: None,
        }
    }

    /// Reference to the metric's own item for the history service.
    pub fn item_ref(&self) -> ItemRef {
        ItemRef {
            itemid: self.item.itemid,
            value_type: self.item.value_type,
            source: self.source,
        }
    }

    /// Whether this metric is the explicit total of the pie.
    pub fn is_total(&self) -> bool {
        self.dataset_aggregation == DatasetAggregation::None && self.role == ItemRole::Total
    }
}
