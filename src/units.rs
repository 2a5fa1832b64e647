//! Unit-aware value formatting.
//!
//! [`convert_units_raw`] scales a value by power prefixes (`K`, `M`, `G`, ...)
//! and renders it with [`format_float`]. `B` and `Bps` use a base of 1024,
//! every other unit 1000. A leading `!` disables conversion for a unit.

use chrono::DateTime;
use serde::Serialize;
use std::fmt;

/// Significant digits kept when formatting floats.
pub const FLOAT_DIG: usize = 15;
/// Default decimals for values with a power prefix.
pub const UNITS_ROUNDOFF_SUFFIXED: u32 = 2;
/// Default decimals for values without a power prefix.
pub const UNITS_ROUNDOFF_UNSUFFIXED: u32 = 4;

const POWER_PREFIXES: [&str; 9] = ["", "K", "M", "G", "T", "P", "E", "Z", "Y"];
const UNITS_BLACKLIST: [&str; 4] = ["%", "ms", "rpm", "RPM"];

const SEC_PER_MIN: i64 = 60;
const SEC_PER_HOUR: i64 = 3600;
const SEC_PER_DAY: i64 = 86400;
const SEC_PER_MONTH: i64 = 30 * SEC_PER_DAY;
const SEC_PER_YEAR: i64 = 365 * SEC_PER_DAY;

/// A formatted value and the units to display next to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedValue {
    pub value: String,
    pub units: String,
    /// False when the value was rendered as text (dates, durations, missing values).
    pub is_numeric: bool,
}

impl fmt::Display for FormattedValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.units.is_empty() {
            write!(f, "{}", self.value)
        } else {
            write!(f, "{} {}", self.value, self.units)
        }
    }
}

/// Float formatting options.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatFormat {
    /// Significant digits.
    pub precision: usize,
    /// Digits after the decimal point, `None` for the default.
    pub decimals: Option<u32>,
    /// Pad to exactly `decimals` digits instead of trimming trailing zeros.
    pub decimals_exact: bool,
    /// Use scientific notation for values too small to show with `decimals`.
    pub small_scientific: bool,
    /// Show values too small to show with `decimals` as `0`.
    pub zero_as_zero: bool,
}

impl Default for FloatFormat {
    fn default() -> Self {
        Self {
            precision: FLOAT_DIG,
            decimals: None,
            decimals_exact: false,
            small_scientific: true,
            zero_as_zero: true,
        }
    }
}

/// Unit conversion options.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    pub value: Option<f64>,
    pub units: String,
    pub decimals: Option<u32>,
    pub decimals_exact: bool,
    pub small_scientific: bool,
    pub zero_as_zero: bool,
    /// Omit milliseconds when formatting `s` units.
    pub ignore_milliseconds: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            value: None,
            units: String::new(),
            decimals: None,
            decimals_exact: false,
            small_scientific: true,
            zero_as_zero: true,
            ignore_milliseconds: false,
        }
    }
}

/// Format `value` with its units, converting to a power prefix when appropriate.
pub fn convert_units_raw(options: &ConvertOptions) -> FormattedValue {
    let value = match options.value {
        Some(v) => v,
        None => {
            return FormattedValue {
                value: String::new(),
                units: String::new(),
                is_numeric: false,
            }
        }
    };

    let text = |value: String| FormattedValue {
        value,
        units: String::new(),
        is_numeric: false,
    };

    match options.units.as_str() {
        "unixtime" => {
            return text(
                DateTime::from_timestamp(value as i64, 0)
                    .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| value.to_string()),
            )
        }
        "uptime" => return text(convert_units_uptime(value)),
        "s" => return text(convert_units_s(value, options.ignore_milliseconds)),
        _ => {}
    }

    let (units, convert) = match options.units.strip_prefix('!') {
        Some(units) => (units, false),
        None => (
            options.units.as_str(),
            !UNITS_BLACKLIST.contains(&options.units.as_str()),
        ),
    };

    let format = |value: f64, default_decimals: u32| {
        format_float(
            value,
            &FloatFormat {
                decimals: Some(options.decimals.unwrap_or(default_decimals)),
                decimals_exact: options.decimals_exact,
                small_scientific: options.small_scientific,
                zero_as_zero: options.zero_as_zero,
                ..Default::default()
            },
        )
    };

    if units.is_empty() || !convert {
        return FormattedValue {
            value: format(value, UNITS_ROUNDOFF_UNSUFFIXED),
            units: units.to_string(),
            is_numeric: true,
        };
    }

    let base: f64 = if units == "B" || units == "Bps" { 1024.0 } else { 1000.0 };

    let mut power = POWER_PREFIXES.len() - 1;
    for (p, _) in POWER_PREFIXES.iter().enumerate() {
        let scaled = round_significant(value / base.powi(p as i32), FLOAT_DIG);
        if scaled.abs() < base {
            power = p;
            break;
        }
    }

    let scaled = value / base.powi(power as i32);
    let default_decimals = if power == 0 {
        UNITS_ROUNDOFF_UNSUFFIXED
    } else {
        UNITS_ROUNDOFF_SUFFIXED
    };

    FormattedValue {
        value: format(scaled, default_decimals),
        units: format!("{}{}", POWER_PREFIXES[power], units),
        is_numeric: true,
    }
}

/// Format a float with a limited number of significant digits and decimals.
pub fn format_float(value: f64, format: &FloatFormat) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let decimals = format.decimals.unwrap_or(UNITS_ROUNDOFF_UNSUFFIXED) as usize;
    let precision = format.precision.max(1);

    let zero = || {
        if format.decimals_exact && decimals > 0 {
            format!("0.{}", "0".repeat(decimals))
        } else {
            "0".to_string()
        }
    };

    let value = round_significant(value, precision);
    if value == 0.0 {
        return zero();
    }

    let exponent = value.abs().log10().floor() as i32;

    if exponent >= precision as i32 {
        return scientific(value, decimals, format.decimals_exact);
    }

    if format.decimals_exact {
        return strip_negative_zero(format!("{:.*}", decimals, value));
    }

    let threshold = 0.5 * 10f64.powi(-(decimals as i32));
    if value.abs() < threshold {
        if format.zero_as_zero {
            return zero();
        }
        if format.small_scientific {
            return scientific(value, decimals, false);
        }

        // Show `decimals` significant digits after the leading zeros.
        let digits = ((-exponent - 1) as usize + decimals).min(precision + (-exponent) as usize);
        return trim_zeros(format!("{:.*}", digits, value));
    }

    strip_negative_zero(trim_zeros(format!("{:.*}", decimals, value)))
}

fn round_significant(value: f64, digits: usize) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return value;
    }
    format!("{:.*e}", digits.saturating_sub(1), value)
        .parse()
        .unwrap_or(value)
}

/// `1.5E+20` style notation.
fn scientific(value: f64, decimals: usize, exact: bool) -> String {
    let formatted = format!("{:.*e}", decimals, value);
    let (mantissa, exponent) = formatted.split_once('e').unwrap_or((&formatted, "0"));
    let mantissa = if exact {
        mantissa.to_string()
    } else {
        trim_zeros(mantissa.to_string())
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{}E{}{}", mantissa, sign, exponent.abs())
}

fn trim_zeros(s: String) -> String {
    if !s.contains('.') {
        return s;
    }
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn strip_negative_zero(s: String) -> String {
    match s.strip_prefix('-') {
        Some(rest) if rest.chars().all(|c| c == '0' || c == '.') => rest.to_string(),
        _ => s,
    }
}

/// Render seconds as up to three of the largest units (`1d 2h 3m`).
pub fn convert_units_s(value: f64, ignore_milliseconds: bool) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();

    if abs < 1.0 {
        let ms = (abs * 1000.0).round() as i64;
        if ignore_milliseconds || ms == 0 {
            return "0".to_string();
        }
        return format!("{}{}ms", sign, ms);
    }

    let mut rest = abs.round() as i64;
    let mut parts = Vec::new();
    for (seconds, suffix) in [
        (SEC_PER_YEAR, "y"),
        (SEC_PER_MONTH, "M"),
        (SEC_PER_DAY, "d"),
        (SEC_PER_HOUR, "h"),
        (SEC_PER_MIN, "m"),
        (1, "s"),
    ] {
        let count = rest / seconds;
        rest %= seconds;
        if count > 0 {
            parts.push(format!("{}{}", count, suffix));
        }
        if parts.len() == 3 {
            break;
        }
    }

    format!("{}{}", sign, parts.join(" "))
}

/// Render seconds as `N days, hh:mm:ss`.
pub fn convert_units_uptime(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let total = value.abs().round() as i64;

    let days = total / SEC_PER_DAY;
    let hours = (total % SEC_PER_DAY) / SEC_PER_HOUR;
    let minutes = (total % SEC_PER_HOUR) / SEC_PER_MIN;
    let seconds = total % SEC_PER_MIN;
    let clock = format!("{:02}:{:02}:{:02}", hours, minutes, seconds);

    match days {
        0 => format!("{}{}", sign, clock),
        1 => format!("{}1 day, {}", sign, clock),
        n => format!("{}{} days, {}", sign, n, clock),
    }
}
