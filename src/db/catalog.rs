//! Collaborator interfaces consumed by the widget pipeline.

use super::models::*;
use super::store::DbError;

/// Item lookup parameters. Every `Some` field narrows the result.
#[derive(Debug, Clone, Default)]
pub struct ItemQuery {
    pub itemids: Option<Vec<ItemId>>,
    pub hostids: Option<Vec<HostId>>,
    pub keys: Option<Vec<String>>,
    /// Wildcard name patterns, any of which may match.
    pub name_patterns: Option<Vec<String>>,
    pub value_types: Option<Vec<ValueType>>,
    pub sort_by_name: bool,
    pub limit: Option<usize>,
}

impl ItemQuery {
    pub fn by_ids(itemids: &[ItemId]) -> Self {
        Self {
            itemids: Some(itemids.to_vec()),
            ..Default::default()
        }
    }

    /// Restrict the query to integer and floating point items.
    pub fn numeric(mut self) -> Self {
        self.value_types = Some(ValueType::NUMERIC.to_vec());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Item and host catalog.
pub trait ItemCatalog {
    fn get_items(&self, query: &ItemQuery) -> Result<Vec<ItemInfo>, DbError>;

    /// Ids of hosts whose name matches any of `name_patterns`, all hosts for `None`.
    fn get_host_ids(&self, name_patterns: Option<&[String]>) -> Result<Vec<HostId>, DbError>;
}

/// Expands user macros in item retention settings.
pub trait MacroResolver {
    fn resolve_time_unit(&self, hostid: HostId, value: &str) -> String;
}

/// Global housekeeping settings.
pub trait RetentionSettings {
    /// Whether the item history storage period is overridden globally.
    fn history_global(&self) -> bool;
    fn history(&self) -> &str;
    /// Whether the item trend storage period is overridden globally.
    fn trends_global(&self) -> bool;
    fn trends(&self) -> &str;
}

/// Historical data aggregation.
pub trait HistoryService {
    /// Aggregate the values of every item in `items` over `[time_from, time_to]`
    /// in intervals of `interval` seconds. Items without data are omitted.
    fn aggregate_by_interval(
        &self,
        items: &[ItemRef],
        time_from: i64,
        time_to: i64,
        function: AggregateFunction,
        interval: i64,
    ) -> Result<Vec<AggregatedSeries>, DbError>;
}
