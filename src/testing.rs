//! Fixtures shared by the store and widget tests.

use std::collections::BTreeMap;

use crate::db::{AggregateFunction, Host, HostId, Item, ItemId, MemoryStore, ValueType};

use crate::widget::{DataSet, DataSetKind, DatasetAggregation, ItemRole};

pub fn host(hostid: HostId, name: &str) -> Host {
    Host {
        hostid,
        name: name.to_string(),
        template: false,
        macros: BTreeMap::new(),
    }
}

pub fn item(itemid: ItemId, hostid: HostId, name: &str, value_type: ValueType, units: &str) -> Item {
    Item {
        itemid,
        hostid,
        name: name.to_string(),
        key: format!("key[{}]", name.to_lowercase()),
        history: "1h".to_string(),
        trends: "365d".to_string(),
        units: units.to_string(),
        value_type,
    }
}

/// Two hosts and a template:
///
/// - 10 "CPU load" (Web server, float, %)
/// - 11 "Agent version" (Web server, text)
/// - 12 "Bytes in" (DB server, unsigned, B)
/// - 13 "CPU idle" (DB server, float, %)
/// - 30 "CPU load" (template, same key as 10)
pub fn sample_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    store.add_host(host(1, "Web server"));
    store.add_host(host(2, "DB server"));
    store.add_host(Host {
        template: true,
        ..host(3, "Linux template")
    });
    store.add_item(item(10, 1, "CPU load", ValueType::Float, "%"));
    store.add_item(item(11, 1, "Agent version", ValueType::Str, ""));
    store.add_item(item(12, 2, "Bytes in", ValueType::Uint64, "B"));
    store.add_item(item(13, 2, "CPU idle", ValueType::Float, "%"));
    store.add_item(item(30, 3, "CPU load", ValueType::Float, "%"));
    store
}

pub fn items_data_set(item_ids: &[ItemId], colors: &[&str], types: &[ItemRole]) -> DataSet {
    DataSet {
        kind: DataSetKind::Items {
            item_ids: item_ids.to_vec(),
            colors: colors.iter().map(|c| c.to_string()).collect(),
            types: types.to_vec(),
        },
        aggregate_function: AggregateFunction::Last,
        dataset_aggregation: DatasetAggregation::None,
        label: String::new(),
    }
}

pub fn pattern_data_set(hosts: &[&str], items: &[&str], color: &str) -> DataSet {
    DataSet {
        kind: DataSetKind::Patterns {
            hosts: hosts.iter().map(|h| h.to_string()).collect(),
            items: items.iter().map(|i| i.to_string()).collect(),
            color: color.to_string(),
        },
        aggregate_function: AggregateFunction::Last,
        dataset_aggregation: DatasetAggregation::None,
        label: String::new(),
    }
}
