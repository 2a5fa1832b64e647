//! Percent-of-total sectors and the "Others" bucket.

use serde::Serialize;

use crate::units::{convert_units_raw, ConvertOptions, FormattedValue};

use super::metric::Metric;
use super::options::MergeConfig;

/// Name of the sector that collects merged sectors.
pub const OTHERS_NAME: &str = "Others";

/// One pie slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sector {
    pub name: String,
    pub color: String,
    pub value: Option<f64>,
    pub formatted_value: FormattedValue,
    pub percent_of_total: f64,
    pub is_total: bool,
}

/// Sectors together with the formatted value of the whole pie.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorsData {
    pub sectors: Vec<Sector>,
    pub total_value: FormattedValue,
}

fn format_value(value: Option<f64>, units: &str) -> FormattedValue {
    convert_units_raw(&ConvertOptions {
        value,
        units: units.to_string(),
        small_scientific: false,
        zero_as_zero: false,
        ..Default::default()
    })
}

/// Turn aggregated metrics into sectors.
///
/// The basis of the percentages is the value of the total sector when there
/// is one, the sum of all values otherwise. With merging enabled, sectors
/// below the threshold are folded into "Others", but only when at least two
/// of them qualify.
pub fn build_sectors(
    metrics: Vec<Metric>,
    merge: Option<&MergeConfig>,
    total_decimals: Option<u32>,
    units: Option<&str>,
) -> SectorsData {
    let mut default_units: Option<String> = None;
    let mut raw_total = 0.0;
    let mut sectors: Vec<Sector> = Vec::with_capacity(metrics.len() + 1);

    for metric in metrics {
        let is_total = metric.is_total();

        let sector_units = match units {
            Some(units) if !units.is_empty() => units.to_string(),
            Some(_) => metric.item.units.clone(),
            None => String::new(),
        };

        let formatted_value = format_value(metric.value, &sector_units);
        default_units.get_or_insert(sector_units);
        raw_total += metric.value.unwrap_or(0.0);

        sectors.push(Sector {
            name: metric.name,
            color: metric.color,
            value: metric.value,
            formatted_value,
            percent_of_total: 0.0,
            is_total,
        });
    }

    if let Some(total) = sectors.iter().find(|s| s.is_total) {
        raw_total = total.value.unwrap_or(0.0);
    }

    let percent_of = |value: f64| value / raw_total * 100.0;

    let mut to_merge: Vec<usize> = Vec::new();
    let mut others_value = 0.0;

    for (index, sector) in sectors.iter_mut().enumerate() {
        sector.percent_of_total = if !sector.is_total && raw_total > 0.0 {
            percent_of(sector.value.unwrap_or(0.0))
        } else {
            100.0
        };

        if let Some(merge) = merge {
            if !sector.is_total && sector.percent_of_total < merge.percent {
                to_merge.push(index);
                others_value += sector.value.unwrap_or(0.0);
            }
        }
    }

    let units = default_units.unwrap_or_default();

    if let Some(merge) = merge.filter(|_| to_merge.len() >= 2) {
        tracing::debug!("SectorBuilder: merging {} sectors into {}", to_merge.len(), OTHERS_NAME);

        let mut index = 0;
        sectors.retain(|_| {
            let keep = !to_merge.contains(&index);
            index += 1;
            keep
        });

        sectors.push(Sector {
            name: OTHERS_NAME.to_string(),
            color: merge.color.clone(),
            value: Some(others_value),
            formatted_value: format_value(Some(others_value), &units),
            percent_of_total: if raw_total > 0.0 { percent_of(others_value) } else { 0.0 },
            is_total: false,
        });
    }

    let total_value = convert_units_raw(&ConvertOptions {
        value: Some(raw_total),
        units,
        decimals: total_decimals,
        decimals_exact: true,
        small_scientific: false,
        zero_as_zero: false,
        ..Default::default()
    });

    SectorsData {
        sectors,
        total_value,
    }
}
