//! Data set resolution into metrics.

use std::collections::{HashMap, VecDeque};

use crate::db::{DbError, HostId, ItemCatalog, ItemId, ItemInfo, ItemQuery};

use super::colors::{get_color_variations, normalize_color};
use super::metric::Metric;
use super::options::{DataSet, DataSetKind, ItemRole};

/// Maximum number of metrics one pie chart shows.
pub const MAX_METRICS: usize = 50;

/// Resolve data sets into metrics ordered by data set, at most [`MAX_METRICS`].
///
/// Non-numeric items are dropped. A data set whose catalog lookup fails is
/// logged and skipped.
pub fn resolve_metrics(
    catalog: &dyn ItemCatalog,
    data_sets: &[DataSet],
    templateid: Option<HostId>,
) -> Vec<Metric> {
    let mut metrics: Vec<Metric> = Vec::new();

    for (index, data_set) in data_sets.iter().enumerate() {
        let remaining = MAX_METRICS.saturating_sub(metrics.len());
        if remaining == 0 {
            tracing::debug!("Resolver: metric limit reached at data set #{}", index + 1);
            break;
        }

        let resolved = match &data_set.kind {
            DataSetKind::Items {
                item_ids,
                colors,
                types,
            } => resolve_items(catalog, item_ids, colors, types, templateid, remaining)
                .map(|items| {
                    items
                        .into_iter()
                        .map(|(item, color, role)| metric(data_set, index, item, color, role))
                        .collect::<Vec<_>>()
                }),
            DataSetKind::Patterns { hosts, items, color } => {
                resolve_patterns(catalog, hosts, items, color, templateid, remaining).map(|items| {
                    items
                        .into_iter()
                        .map(|(item, color)| metric(data_set, index, item, color, ItemRole::Normal))
                        .collect::<Vec<_>>()
                })
            }
        };

        match resolved {
            Ok(new_metrics) => {
                tracing::debug!(
                    "Resolver: data set #{} resolved to {} metrics",
                    index + 1,
                    new_metrics.len()
                );
                metrics.extend(new_metrics.into_iter().take(remaining));
            }
            Err(e) => {
                tracing::warn!("Resolver: failed to resolve data set #{}: {}", index + 1, e);
            }
        }
    }

    metrics.sort_by_key(|m| m.data_set);
    metrics
}

fn metric(data_set: &DataSet, index: usize, item: ItemInfo, color: String, role: ItemRole) -> Metric {
    Metric::new(
        item,
        index,
        color,
        role,
        data_set.aggregate_function,
        data_set.dataset_aggregation,
    )
}

/// `None` when any pattern is the `*` wildcard, meaning no name filter at all.
pub fn process_pattern(patterns: &[String]) -> Option<Vec<String>> {
    if patterns.iter().any(|p| p == "*") {
        None
    } else {
        Some(patterns.to_vec())
    }
}

/// Take the next palette entry, moving it to the back so palettes cycle.
fn next_cycled<T: Clone>(palette: &mut VecDeque<T>) -> Option<T> {
    let value = palette.pop_front()?;
    palette.push_back(value.clone());
    Some(value)
}

fn resolve_items(
    catalog: &dyn ItemCatalog,
    item_ids: &[ItemId],
    colors: &[String],
    types: &[ItemRole],
    templateid: Option<HostId>,
    limit: usize,
) -> Result<Vec<(ItemInfo, String, ItemRole)>, DbError> {
    if item_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut item_ids = item_ids.to_vec();

    if let Some(templateid) = templateid {
        let keys: Vec<String> = catalog
            .get_items(&ItemQuery::by_ids(&item_ids))?
            .into_iter()
            .map(|i| i.key)
            .collect();

        if !keys.is_empty() {
            let query = ItemQuery {
                hostids: Some(vec![templateid]),
                keys: Some(keys),
                ..Default::default()
            };
            item_ids = catalog.get_items(&query)?.into_iter().map(|i| i.itemid).collect();
        }
    }

    if item_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut found: HashMap<ItemId, ItemInfo> = catalog
        .get_items(&ItemQuery::by_ids(&item_ids).numeric())?
        .into_iter()
        .filter(|i| i.value_type.is_numeric())
        .map(|i| (i.itemid, i))
        .collect();

    let mut colors: VecDeque<String> = colors.iter().map(|c| normalize_color(c)).collect();
    let mut types: VecDeque<ItemRole> = types.iter().copied().collect();

    Ok(item_ids
        .iter()
        .filter_map(|id| found.remove(id))
        .take(limit)
        .map(|item| {
            let color = next_cycled(&mut colors).unwrap_or_default();
            let role = next_cycled(&mut types).unwrap_or_default();
            (item, color, role)
        })
        .collect())
}

fn resolve_patterns(
    catalog: &dyn ItemCatalog,
    hosts: &[String],
    items: &[String],
    color: &str,
    templateid: Option<HostId>,
    limit: usize,
) -> Result<Vec<(ItemInfo, String)>, DbError> {
    if items.is_empty() || (templateid.is_none() && hosts.is_empty()) {
        return Ok(Vec::new());
    }

    let hostids = match templateid {
        Some(templateid) => vec![templateid],
        None => catalog.get_host_ids(process_pattern(hosts).as_deref())?,
    };

    if hostids.is_empty() {
        return Ok(Vec::new());
    }

    let query = ItemQuery {
        hostids: Some(hostids),
        name_patterns: process_pattern(items),
        sort_by_name: true,
        ..Default::default()
    }
    .numeric()
    .limit(limit);

    let found: Vec<ItemInfo> = catalog
        .get_items(&query)?
        .into_iter()
        .filter(|i| i.value_type.is_numeric())
        .collect();

    let colors = get_color_variations(color, found.len());

    Ok(found.into_iter().zip(colors).collect())
}
