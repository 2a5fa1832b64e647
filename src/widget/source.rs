//! History or trends selection per metric.

use crate::db::{MacroResolver, RetentionSettings, Source};
use crate::timeperiod::TimePeriod;
use crate::timeunit::parse_simple_interval;

use super::metric::Metric;
use super::options::DataSource;

/// Storage period field of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RetentionField {
    History,
    Trends,
}

impl RetentionField {
    fn name(self) -> &'static str {
        match self {
            RetentionField::History => "history",
            RetentionField::Trends => "trends",
        }
    }

    fn error(self) -> String {
        let reason = match self {
            RetentionField::History => "invalid history storage period",
            RetentionField::Trends => "invalid trend storage period",
        };
        format!("Incorrect value for field \"{}\": {}.", self.name(), reason)
    }
}

/// Pick the source each metric is read from.
///
/// In [`DataSource::Auto`] mode history is used when trends are disabled or
/// when history still covers the start of the period. Metrics with a storage
/// period that cannot be parsed are dropped and reported in `errors`.
pub fn select_sources(
    metrics: Vec<Metric>,
    errors: &mut Vec<String>,
    data_source: DataSource,
    period: &TimePeriod,
    now: i64,
    retention: &dyn RetentionSettings,
    macros: &dyn MacroResolver,
) -> Vec<Metric> {
    let forced = match data_source {
        DataSource::History => Some(Source::History),
        DataSource::Trends => Some(Source::Trends),
        DataSource::Auto => None,
    };

    if let Some(source) = forced {
        return metrics
            .into_iter()
            .map(|mut metric| {
                metric.source = source;
                metric
            })
            .collect();
    }

    let mut selected = Vec::with_capacity(metrics.len());

    for mut metric in metrics {
        let history = storage_period(&metric, RetentionField::History, retention, macros);
        let trends = storage_period(&metric, RetentionField::Trends, retention, macros);

        let (history, trends) = match (history, trends) {
            (Some(history), Some(trends)) => (history, trends),
            (history, trends) => {
                for (value, field) in [
                    (history, RetentionField::History),
                    (trends, RetentionField::Trends),
                ] {
                    if value.is_none() {
                        errors.push(field.error());
                    }
                }
                tracing::warn!(
                    "SourceSelector: dropping item {} with invalid storage period",
                    metric.item.itemid
                );
                continue;
            }
        };

        metric.history_seconds = history;
        metric.trends_seconds = trends;
        metric.source = if trends == 0 || now - history < period.time_from {
            Source::History
        } else {
            Source::Trends
        };

        tracing::debug!(
            "SourceSelector: item {} reads {} (history={}s, trends={}s)",
            metric.item.itemid,
            metric.source,
            history,
            trends
        );

        selected.push(metric);
    }

    selected
}

/// Storage period in seconds, from the global override or the item itself.
fn storage_period(
    metric: &Metric,
    field: RetentionField,
    retention: &dyn RetentionSettings,
    macros: &dyn MacroResolver,
) -> Option<i64> {
    let (global, global_value, item_value) = match field {
        RetentionField::History => (
            retention.history_global(),
            retention.history(),
            &metric.item.history,
        ),
        RetentionField::Trends => (
            retention.trends_global(),
            retention.trends(),
            &metric.item.trends,
        ),
    };

    let value = if global {
        global_value.to_string()
    } else {
        macros.resolve_time_unit(metric.item.hostid, item_value)
    };

    parse_simple_interval(&value).ok()
}
