//! Simple time interval parsing and user macro expansion.
//!
//! A simple interval is a non-negative integer with an optional unit suffix:
//! `s`, `m`, `h`, `d` or `w` (`90d`, `3600`, `1w`).

use regex::{Captures, Regex};
use std::sync::OnceLock;
use thiserror::Error;

/// Interval parsing errors.
#[derive(Error, Debug, PartialEq)]
pub enum IntervalError {
    #[error("invalid time interval \"{0}\"")]
    Invalid(String),
    #[error("time interval \"{0}\" is too large")]
    Overflow(String),
}

pub const SEC_PER_MIN: i64 = 60;
pub const SEC_PER_HOUR: i64 = 3600;
pub const SEC_PER_DAY: i64 = 86400;
pub const SEC_PER_WEEK: i64 = 7 * SEC_PER_DAY;

fn simple_interval_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([0-9]+)([smhdw]?)$").expect("valid interval regex"))
}

fn user_macro_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\{\$([A-Z0-9_.]+)(?::(?:"[^"]*"|[^}]*))?\}"#).expect("valid macro regex")
    })
}

/// Number of seconds in one unit of `suffix`.
pub fn unit_seconds(suffix: &str) -> Option<i64> {
    match suffix {
        "" | "s" => Some(1),
        "m" => Some(SEC_PER_MIN),
        "h" => Some(SEC_PER_HOUR),
        "d" => Some(SEC_PER_DAY),
        "w" => Some(SEC_PER_WEEK),
        _ => None,
    }
}

/// Parse a simple interval into seconds.
pub fn parse_simple_interval(value: &str) -> Result<i64, IntervalError> {
    let caps = simple_interval_regex()
        .captures(value)
        .ok_or_else(|| IntervalError::Invalid(value.to_string()))?;

    let number: i64 = caps[1]
        .parse()
        .map_err(|_| IntervalError::Overflow(value.to_string()))?;
    let multiplier =
        unit_seconds(&caps[2]).ok_or_else(|| IntervalError::Invalid(value.to_string()))?;

    number
        .checked_mul(multiplier)
        .ok_or_else(|| IntervalError::Overflow(value.to_string()))
}

/// Replace every user macro in `value` with the result of `lookup`.
///
/// Macros with context (`{$NAME:"ctx"}`) are looked up verbatim first and then
/// without the context. Unknown macros are left untouched.
pub fn expand_user_macros<F>(value: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    user_macro_regex()
        .replace_all(value, |caps: &Captures| {
            let full = &caps[0];
            lookup(full)
                .or_else(|| lookup(&format!("{{${}}}", &caps[1])))
                .unwrap_or_else(|| full.to_string())
        })
        .into_owned()
}
