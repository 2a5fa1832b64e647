//! Widget field values as posted by the dashboard.
//!
//! [`WidgetFields`] deserializes the raw field bag with defaults, validates it
//! and turns it into [`PieChartOptions`], the legend and the drawing config.

use std::path::Path;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::{AggregateFunction, HostId, ItemId};
use crate::timeperiod::{TimePeriod, TimePeriodError};

use super::options::{
    DataSet, DataSetKind, DataSource, DatasetAggregation, ItemRole, MergeConfig, PieChartOptions,
};
use super::sectors::Sector;

pub const DEFAULT_NAME: &str = "Pie chart";

/// Color of a data set posted without one.
pub const DEFAULT_COLOR: &str = "FF465C";

/// Widget field errors.
#[derive(Error, Debug)]
pub enum FieldsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Incorrect value for field \"{field}\": value must be between {min} and {max}.")]
    OutOfRange {
        field: String,
        min: u32,
        max: u32,
    },
    #[error("Incorrect value for field \"{field}\": a hexadecimal color code (6 symbols) is expected.")]
    InvalidColor { field: String },
    #[error("Invalid time period: {0}")]
    TimePeriod(#[from] TimePeriodError),
}

fn color_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9A-Fa-f]{6}$").expect("valid color regex"))
}

fn check_color(field: &str, color: &str) -> Result<(), FieldsError> {
    if color_regex().is_match(color) {
        Ok(())
    } else {
        Err(FieldsError::InvalidColor {
            field: field.to_string(),
        })
    }
}

fn check_range(field: &str, value: u32, min: u32, max: u32) -> Result<(), FieldsError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(FieldsError::OutOfRange {
            field: field.to_string(),
            min,
            max,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSetType {
    SingleItem,
    #[default]
    PatternItem,
}

/// A single color or a palette; item data sets post a list, pattern data sets one color.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ColorField {
    One(String),
    Many(Vec<String>),
}

impl Default for ColorField {
    fn default() -> Self {
        ColorField::Many(Vec::new())
    }
}

impl ColorField {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            ColorField::One(color) => vec![color.clone()],
            ColorField::Many(colors) => colors.clone(),
        }
    }
}

/// Field values of one data set.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct DataSetFields {
    pub dataset_type: DataSetType,
    pub itemids: Vec<ItemId>,
    pub hosts: Vec<String>,
    pub items: Vec<String>,
    pub color: ColorField,
    #[serde(rename = "type")]
    pub types: Vec<ItemRole>,
    pub aggregate_function: AggregateFunction,
    pub dataset_aggregation: DatasetAggregation,
    pub data_set_label: String,
}

impl DataSetFields {
    fn to_data_set(&self, index: usize) -> Result<DataSet, FieldsError> {
        let field = format!("ds[{}][color]", index);
        let mut colors = self.color.to_vec();
        if colors.is_empty() {
            colors.push(DEFAULT_COLOR.to_string());
        }

        let kind = match self.dataset_type {
            DataSetType::SingleItem => {
                for color in &colors {
                    check_color(&field, color)?;
                }
                DataSetKind::Items {
                    item_ids: self.itemids.clone(),
                    colors,
                    types: self.types.clone(),
                }
            }
            DataSetType::PatternItem => {
                let color = colors.swap_remove(0);
                check_color(&field, &color)?;
                DataSetKind::Patterns {
                    hosts: self.hosts.clone(),
                    items: self.items.clone(),
                    color,
                }
            }
        };

        Ok(DataSet {
            kind,
            aggregate_function: self.aggregate_function,
            dataset_aggregation: self.dataset_aggregation,
            label: self.data_set_label.clone(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawType {
    #[default]
    Pie,
    Doughnut,
}

/// Field values of a pie chart widget.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WidgetFields {
    pub name: String,
    pub ds: Vec<DataSetFields>,
    pub source: DataSource,
    pub time_from: String,
    pub time_to: String,
    pub templateid: Option<HostId>,

    pub merge: bool,
    pub merge_percent: u32,
    pub merge_color: String,

    pub total_show: bool,
    pub decimal_places: u32,
    pub units_show: bool,
    pub units: String,

    pub legend: bool,
    pub legend_lines: u32,
    pub legend_columns: u32,

    pub draw_type: DrawType,
    pub width: u32,
    pub stroke: u32,
    pub space: u32,
    pub value_size: u32,
    pub value_bold: bool,
    pub value_color: String,
}

impl Default for WidgetFields {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            ds: Vec::new(),
            source: DataSource::Auto,
            time_from: "now-1h".to_string(),
            time_to: "now".to_string(),
            templateid: None,
            merge: false,
            merge_percent: 10,
            merge_color: "768D99".to_string(),
            total_show: false,
            decimal_places: 2,
            units_show: false,
            units: String::new(),
            legend: true,
            legend_lines: 1,
            legend_columns: 4,
            draw_type: DrawType::Pie,
            width: 50,
            stroke: 0,
            space: 1,
            value_size: 20,
            value_bold: false,
            value_color: String::new(),
        }
    }
}

impl WidgetFields {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, FieldsError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<Self, FieldsError> {
        let fields: Self = serde_json::from_str(data)?;
        tracing::debug!("WidgetFields: loaded \"{}\" with {} data sets", fields.name, fields.ds.len());
        Ok(fields)
    }

    /// Check ranges and colors of the fields that are in effect.
    pub fn validate(&self) -> Result<(), FieldsError> {
        if self.merge {
            check_range("merge_percent", self.merge_percent, 1, 10)?;
            check_color("merge_color", &self.merge_color)?;
        }
        if self.total_show {
            check_range("decimal_places", self.decimal_places, 0, 6)?;
        }
        if self.legend {
            check_range("legend_lines", self.legend_lines, 1, 10)?;
            check_range("legend_columns", self.legend_columns, 1, 4)?;
        }
        check_range("stroke", self.stroke, 0, 10)?;
        check_range("space", self.space, 0, 10)?;

        if self.draw_type == DrawType::Doughnut {
            check_range("width", self.width, 20, 50)?;
            if self.total_show {
                check_range("value_size", self.value_size, 1, 100)?;
                if !self.value_color.is_empty() {
                    check_color("value_color", &self.value_color)?;
                }
            }
        }

        Ok(())
    }

    /// Validate the fields and build the pipeline options for `now`.
    pub fn to_options(&self, now: DateTime<Utc>) -> Result<PieChartOptions, FieldsError> {
        self.validate()?;

        let data_sets = self
            .ds
            .iter()
            .enumerate()
            .map(|(index, ds)| ds.to_data_set(index))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PieChartOptions {
            data_sets,
            data_source: self.source,
            time_period: TimePeriod::parse(&self.time_from, &self.time_to, now)?,
            templateid: self.templateid,
            merge: self.merge.then(|| MergeConfig {
                percent: f64::from(self.merge_percent),
                color: format!("#{}", self.merge_color),
            }),
            total_decimals: self.total_show.then_some(self.decimal_places),
            units: self.units_show.then(|| self.units.clone()),
            now: now.timestamp(),
        })
    }

    pub fn legend(&self, sectors: &[Sector]) -> Legend {
        Legend {
            data: sectors
                .iter()
                .map(|s| LegendEntry {
                    name: s.name.clone(),
                    color: s.color.clone(),
                })
                .collect(),
            show: self.legend,
            lines: self.legend.then_some(self.legend_lines),
            columns: self.legend.then_some(self.legend_columns),
        }
    }

    /// Drawing settings. Width and the total value only apply to doughnuts.
    pub fn config(&self) -> ChartConfig {
        let doughnut = self.draw_type == DrawType::Doughnut;

        let total_value = doughnut.then(|| {
            if self.total_show {
                TotalValueConfig {
                    show: true,
                    size: Some(self.value_size),
                    is_bold: Some(self.value_bold),
                    color: (!self.value_color.is_empty()).then(|| format!("#{}", self.value_color)),
                    units_show: Some(self.units_show),
                }
            } else {
                TotalValueConfig::default()
            }
        });

        ChartConfig {
            draw_type: self.draw_type,
            stroke: self.stroke,
            space: self.space,
            width: doughnut.then_some(self.width),
            total_value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub data: Vec<LegendEntry>,
    pub show: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lines: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TotalValueConfig {
    pub show: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units_show: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    pub draw_type: DrawType,
    pub stroke: u32,
    pub space: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_value: Option<TotalValueConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_defaults() {
        let fields = WidgetFields::from_json("{}").unwrap();
        assert_eq!(fields, WidgetFields::default());

        let options = fields.to_options(now()).unwrap();
        assert!(options.data_sets.is_empty());
        assert_eq!(options.data_source, DataSource::Auto);
        assert_eq!(options.time_period.interval(), 3600);
        assert_eq!(options.time_period.time_to, now().timestamp());
        assert_eq!(options.merge, None);
        assert_eq!(options.total_decimals, None);
        assert_eq!(options.units, None);
    }

    #[test]
    fn test_data_sets() {
        let fields = WidgetFields::from_json(
            r#"{
                "ds": [
                    {
                        "dataset_type": "single_item",
                        "itemids": [10, 12],
                        "color": ["FF0000", "00FF00"],
                        "type": ["normal", "total"],
                        "aggregate_function": "avg"
                    },
                    {
                        "hosts": ["Web*"],
                        "items": ["CPU*"],
                        "color": "0000FF",
                        "dataset_aggregation": "sum",
                        "data_set_label": "CPU"
                    }
                ]
            }"#,
        )
        .unwrap();

        let options = fields.to_options(now()).unwrap();
        assert_eq!(
            options.data_sets[0].kind,
            DataSetKind::Items {
                item_ids: vec![10, 12],
                colors: vec!["FF0000".to_string(), "00FF00".to_string()],
                types: vec![ItemRole::Normal, ItemRole::Total],
            }
        );
        assert_eq!(options.data_sets[0].aggregate_function, AggregateFunction::Avg);

        let patterns = &options.data_sets[1];
        assert_eq!(
            patterns.kind,
            DataSetKind::Patterns {
                hosts: vec!["Web*".to_string()],
                items: vec!["CPU*".to_string()],
                color: "0000FF".to_string(),
            }
        );
        assert_eq!(patterns.aggregate_function, AggregateFunction::Last);
        assert_eq!(patterns.dataset_aggregation, DatasetAggregation::Sum);
        assert_eq!(patterns.label, "CPU");
    }

    #[test]
    fn test_data_set_without_color_gets_default() {
        let fields = WidgetFields::from_json(
            r#"{
                "ds": [
                    {"hosts": ["*"], "items": ["CPU*"]},
                    {"dataset_type": "single_item", "itemids": [10]}
                ]
            }"#,
        )
        .unwrap();

        let options = fields.to_options(now()).unwrap();
        assert!(matches!(
            &options.data_sets[0].kind,
            DataSetKind::Patterns { color, .. } if color == DEFAULT_COLOR
        ));
        assert!(matches!(
            &options.data_sets[1].kind,
            DataSetKind::Items { colors, .. } if colors == &vec![DEFAULT_COLOR.to_string()]
        ));
    }

    #[test]
    fn test_merge_total_and_units() {
        let fields = WidgetFields {
            merge: true,
            merge_percent: 5,
            total_show: true,
            decimal_places: 3,
            units_show: true,
            ..Default::default()
        };

        let options = fields.to_options(now()).unwrap();
        assert_eq!(
            options.merge,
            Some(MergeConfig {
                percent: 5.0,
                color: "#768D99".to_string(),
            })
        );
        assert_eq!(options.total_decimals, Some(3));
        assert_eq!(options.units, Some(String::new()));
    }

    #[test]
    fn test_validation() {
        let fields = WidgetFields {
            merge: true,
            merge_percent: 11,
            ..Default::default()
        };
        assert!(matches!(
            fields.to_options(now()),
            Err(FieldsError::OutOfRange { ref field, min: 1, max: 10 }) if field == "merge_percent"
        ));

        // Out of range values are fine while the setting is off.
        let fields = WidgetFields {
            merge_percent: 11,
            ..Default::default()
        };
        assert!(fields.to_options(now()).is_ok());

        let fields = WidgetFields {
            ds: vec![DataSetFields {
                color: ColorField::One("red".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let err = fields.to_options(now()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Incorrect value for field \"ds[0][color]\": a hexadecimal color code (6 symbols) is expected."
        );

        let fields = WidgetFields {
            time_from: "yesterday".to_string(),
            ..Default::default()
        };
        assert!(matches!(fields.to_options(now()), Err(FieldsError::TimePeriod(_))));
    }

    #[test]
    fn test_legend() {
        let sector = Sector {
            name: "CPU".to_string(),
            color: "#FF0000".to_string(),
            value: Some(1.0),
            formatted_value: crate::units::FormattedValue {
                value: "1".to_string(),
                units: String::new(),
                is_numeric: true,
            },
            percent_of_total: 100.0,
            is_total: false,
        };

        let legend = WidgetFields::default().legend(std::slice::from_ref(&sector));
        assert!(legend.show);
        assert_eq!(legend.lines, Some(1));
        assert_eq!(legend.columns, Some(4));
        assert_eq!(
            legend.data,
            vec![LegendEntry {
                name: "CPU".to_string(),
                color: "#FF0000".to_string(),
            }]
        );

        let hidden = WidgetFields {
            legend: false,
            ..Default::default()
        };
        let json = serde_json::to_value(hidden.legend(&[sector])).unwrap();
        assert_eq!(json["show"], false);
        assert!(json.get("lines").is_none());
    }

    #[test]
    fn test_config() {
        let pie = WidgetFields::default().config();
        assert_eq!(pie.width, None);
        assert_eq!(pie.total_value, None);

        let doughnut = WidgetFields {
            draw_type: DrawType::Doughnut,
            width: 30,
            total_show: true,
            value_bold: true,
            value_color: "112233".to_string(),
            ..Default::default()
        };
        let config = doughnut.config();
        assert_eq!(config.width, Some(30));
        assert_eq!(
            config.total_value,
            Some(TotalValueConfig {
                show: true,
                size: Some(20),
                is_bold: Some(true),
                color: Some("#112233".to_string()),
                units_show: Some(false),
            })
        );

        let hidden_total = WidgetFields {
            draw_type: DrawType::Doughnut,
            ..Default::default()
        };
        let json = serde_json::to_value(hidden_total.config()).unwrap();
        assert_eq!(json["total_value"], serde_json::json!({ "show": false }));
    }

    #[test]
    fn test_load_from_path() {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(tmp, r#"{{"name": "Disk usage", "source": "trends", "draw_type": "doughnut"}}"#).unwrap();

        let fields = WidgetFields::from_path(tmp.path()).unwrap();
        assert_eq!(fields.name, "Disk usage");
        assert_eq!(fields.source, DataSource::Trends);
        assert_eq!(fields.draw_type, DrawType::Doughnut);
        assert_eq!(fields.legend_columns, 4);

        assert!(matches!(
            WidgetFields::from_json("{\"name\": 5}"),
            Err(FieldsError::Json(_))
        ));
    }
}
