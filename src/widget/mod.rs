//! Pie chart widget pipeline.
//!
//! Data sets are resolved into metrics, each metric gets a data source,
//! values are aggregated over the time period and finally turned into
//! sectors with percentages of the total.

mod aggregate;
mod colors;
mod fields;
mod metric;
mod options;
mod resolver;
mod sectors;
mod source;

pub use aggregate::*;
pub use colors::*;
pub use fields::*;
pub use metric::*;
pub use options::*;
pub use resolver::*;
pub use sectors::*;
pub use source::*;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::{HistoryService, ItemCatalog, MacroResolver, RetentionSettings};
use crate::units::FormattedValue;

/// Result of one pie chart computation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieChartData {
    pub sectors: Vec<Sector>,
    pub total_value: FormattedValue,
    /// Validation messages for metrics that were dropped.
    pub errors: Vec<String>,
}

/// Everything the dashboard needs to draw the widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetView {
    pub name: String,
    pub sectors: Vec<Sector>,
    pub legend: Legend,
    pub total_value: FormattedValue,
    pub config: ChartConfig,
    pub errors: Vec<String>,
}

/// Pie chart computation over the catalog and history collaborators.
pub struct PieChart<'a> {
    catalog: &'a dyn ItemCatalog,
    history: &'a dyn HistoryService,
    macros: &'a dyn MacroResolver,
    retention: &'a dyn RetentionSettings,
}

impl<'a> PieChart<'a> {
    pub fn new(
        catalog: &'a dyn ItemCatalog,
        history: &'a dyn HistoryService,
        macros: &'a dyn MacroResolver,
        retention: &'a dyn RetentionSettings,
    ) -> Self {
        Self {
            catalog,
            history,
            macros,
            retention,
        }
    }

    pub fn get_data(&self, options: &PieChartOptions) -> PieChartData {
        let mut errors = Vec::new();

        let metrics = resolve_metrics(self.catalog, &options.data_sets, options.templateid);
        let metrics = select_sources(
            metrics,
            &mut errors,
            options.data_source,
            &options.time_period,
            options.now,
            self.retention,
            self.macros,
        );
        let metrics = aggregate_metrics(
            metrics,
            &options.data_sets,
            &options.time_period,
            self.history,
        );

        let SectorsData {
            sectors,
            total_value,
        } = build_sectors(
            metrics,
            options.merge.as_ref(),
            options.total_decimals,
            options.units.as_deref(),
        );

        tracing::debug!(
            "PieChart: {} sectors, total {}, {} errors",
            sectors.len(),
            total_value,
            errors.len()
        );

        PieChartData {
            sectors,
            total_value,
            errors,
        }
    }

    /// Compute the full widget view from posted field values.
    pub fn view(&self, fields: &WidgetFields, now: DateTime<Utc>) -> Result<WidgetView, FieldsError> {
        let options = fields.to_options(now)?;
        let data = self.get_data(&options);

        Ok(WidgetView {
            name: fields.name.clone(),
            legend: fields.legend(&data.sectors),
            config: fields.config(),
            sectors: data.sectors,
            total_value: data.total_value,
            errors: data.errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HousekeepingConfig;
    use crate::db::{AggregateFunction, MemoryStore};
    use crate::testing::*;
    use crate::timeperiod::TimePeriod;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap()
    }

    fn store() -> MemoryStore {
        let now = now().timestamp();
        let mut store = sample_store();
        store.add_history(10, now - 600, 25.0);
        store.add_history(10, now - 60, 30.0);
        store.add_history(13, now - 60, 70.0);
        store.add_history(12, now - 60, 2.0);
        store
    }

    fn options(data_sets: Vec<DataSet>) -> PieChartOptions {
        let now = now().timestamp();
        PieChartOptions {
            data_sets,
            data_source: DataSource::Auto,
            time_period: TimePeriod::new(now - 1800, now),
            templateid: None,
            merge: None,
            total_decimals: Some(0),
            units: None,
            now,
        }
    }

    #[test]
    fn test_two_data_sets() {
        let store = store();
        let config = HousekeepingConfig::default();
        let chart = PieChart::new(&store, &store, &store, &config);

        let data = chart.get_data(&options(vec![
            items_data_set(&[10], &["FF0000"], &[]),
            items_data_set(&[13], &["00FF00"], &[]),
        ]));

        assert!(data.errors.is_empty());
        assert_eq!(data.sectors.len(), 2);
        assert_eq!(data.sectors[0].name, "last(Web server: CPU load)");
        assert_eq!(data.sectors[0].color, "#FF0000");
        assert_eq!(data.sectors[0].value, Some(30.0));
        assert!((data.sectors[0].percent_of_total - 30.0).abs() < 1e-9);
        assert!((data.sectors[1].percent_of_total - 70.0).abs() < 1e-9);
        assert_eq!(data.total_value.to_string(), "100");
    }

    #[test]
    fn test_aggregated_pattern_data_set() {
        let store = store();
        let config = HousekeepingConfig::default();
        let chart = PieChart::new(&store, &store, &store, &config);

        let mut cpu = pattern_data_set(&["*"], &["CPU*"], "0000FF");
        cpu.dataset_aggregation = DatasetAggregation::Sum;
        cpu.aggregate_function = AggregateFunction::Max;
        cpu.label = "CPU".to_string();

        let data = chart.get_data(&options(vec![cpu, items_data_set(&[12], &["FF0000"], &[])]));
        let names: Vec<_> = data.sectors.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["CPU", "last(DB server: Bytes in)"]);
        assert_eq!(data.sectors[0].value, Some(100.0));
        assert_eq!(data.total_value.to_string(), "102");
    }

    #[test]
    fn test_value_at_period_end_is_included() {
        let now = now().timestamp();
        let mut store = sample_store();
        store.add_history(10, now - 1000, 10.0);
        store.add_history(10, now, 30.0);
        let config = HousekeepingConfig::default();
        let chart = PieChart::new(&store, &store, &store, &config);

        let mut data_set = items_data_set(&[10], &["FF0000"], &[]);
        data_set.aggregate_function = AggregateFunction::Avg;

        let data = chart.get_data(&options(vec![data_set]));
        assert_eq!(data.sectors[0].value, Some(20.0));
    }

    #[test]
    fn test_invalid_storage_period_is_reported() {
        let mut store = store();
        store.items.iter_mut().find(|i| i.itemid == 13).unwrap().history = "{$MISSING}".to_string();
        let config = HousekeepingConfig::default();
        let chart = PieChart::new(&store, &store, &store, &config);

        let data = chart.get_data(&options(vec![items_data_set(&[10, 13], &["FF0000"], &[])]));
        assert_eq!(data.sectors.len(), 1);
        assert_eq!(
            data.errors,
            vec!["Incorrect value for field \"history\": invalid history storage period.".to_string()]
        );
    }

    #[test]
    fn test_view() {
        let store = store();
        let config = HousekeepingConfig::default();
        let chart = PieChart::new(&store, &store, &store, &config);

        let fields = WidgetFields::from_json(
            r#"{
                "name": "CPU",
                "time_from": "now-30m",
                "ds": [
                    {"dataset_type": "single_item", "itemids": [10, 13], "color": ["FF0000", "00FF00"]}
                ],
                "merge": true,
                "merge_percent": 10,
                "total_show": true,
                "decimal_places": 1,
                "units_show": true,
                "draw_type": "doughnut"
            }"#,
        )
        .unwrap();

        let view = chart.view(&fields, now()).unwrap();
        assert_eq!(view.name, "CPU");
        assert_eq!(view.sectors.len(), 2);
        assert_eq!(view.legend.data.len(), 2);
        assert_eq!(view.legend.data[1].color, "#00FF00");
        assert_eq!(view.total_value.to_string(), "100.0 %");
        assert_eq!(view.config.width, Some(50));

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["sectors"][0]["formatted_value"]["units"], "%");
        assert_eq!(json["config"]["total_value"]["show"], true);
    }
}
