//! Value aggregation per data set or per item.

use std::collections::HashMap;

use crate::db::HistoryService;
use crate::timeperiod::TimePeriod;

use super::metric::Metric;
use super::options::{DataSet, DatasetAggregation};

/// Largest supported aggregation window, 25 years.
pub const MAX_TIMESHIFT: i64 = 788_400_000;

/// Separator between host and item names in sector names.
pub const NAME_DELIMITER: &str = ": ";

/// Name the metrics, group aggregated data sets and fetch their values.
///
/// Metrics of a data set with [`DatasetAggregation`] other than `None` are
/// folded into the first metric of that data set. Nothing is returned when
/// the period is empty or longer than [`MAX_TIMESHIFT`].
pub fn aggregate_metrics(
    metrics: Vec<Metric>,
    data_sets: &[DataSet],
    period: &TimePeriod,
    history: &dyn HistoryService,
) -> Vec<Metric> {
    let interval = period.interval();
    if !(1..=MAX_TIMESHIFT).contains(&interval) {
        tracing::warn!("Aggregator: invalid aggregation interval {}s, skipping", interval);
        return Vec::new();
    }

    let mut grouped: Vec<Metric> = Vec::with_capacity(metrics.len());
    let mut data_set_slots: HashMap<usize, usize> = HashMap::new();

    for mut metric in metrics {
        let item_ref = metric.item_ref();

        if let Some(&slot) = data_set_slots.get(&metric.data_set) {
            grouped[slot].items.push(item_ref);
            continue;
        }

        metric.name = sector_name(&metric, data_sets);
        metric.items.push(item_ref);

        if metric.dataset_aggregation != DatasetAggregation::None {
            data_set_slots.insert(metric.data_set, grouped.len());
        }

        grouped.push(metric);
    }

    for metric in &mut grouped {
        let results = match history.aggregate_by_interval(
            &metric.items,
            period.time_from,
            period.time_to,
            metric.aggregate_function,
            interval,
        ) {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!("Aggregator: failed to fetch values for {}: {}", metric.name, e);
                continue;
            }
        };

        if results.is_empty() {
            continue;
        }

        let values: Vec<Option<f64>> = results
            .iter()
            .map(|series| series.data.first().map(|point| point.value))
            .collect();

        metric.value = aggregate_values(&values, metric.dataset_aggregation);

        tracing::debug!(
            "Aggregator: {} = {:?} from {} items",
            metric.name,
            metric.value,
            metric.items.len()
        );
    }

    grouped
}

fn sector_name(metric: &Metric, data_sets: &[DataSet]) -> String {
    if metric.dataset_aggregation == DatasetAggregation::None {
        return format!(
            "{}({}{}{})",
            metric.aggregate_function.label(),
            metric.item.host_name,
            NAME_DELIMITER,
            metric.item.name
        );
    }

    match data_sets.get(metric.data_set) {
        Some(data_set) if !data_set.label.is_empty() => data_set.label.clone(),
        _ => format!("Data set #{}", metric.data_set + 1),
    }
}

/// Combine the per-item values of one metric.
///
/// `Avg` averages the values that are present, `Count` counts every returned
/// value, `None` takes the first one.
pub fn aggregate_values(values: &[Option<f64>], aggregation: DatasetAggregation) -> Option<f64> {
    let present = values.iter().flatten().copied();

    match aggregation {
        DatasetAggregation::None => values.first().copied().flatten(),
        DatasetAggregation::Min => present.reduce(f64::min),
        DatasetAggregation::Max => present.reduce(f64::max),
        DatasetAggregation::Avg => {
            let (sum, count) = present.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
            (count > 0).then(|| sum / count as f64)
        }
        DatasetAggregation::Count => Some(values.len() as f64),
        DatasetAggregation::Sum => Some(present.sum()),
    }
}
