//! Widget time period parsing.
//!
//! Accepts absolute times (`2024-01-01 12:00:00`, `2024-01-01 12:00`,
//! `2024-01-01`, `2024-01`) and relative ones built from `now`, offsets and
//! rounding: `now-1h`, `now/d`, `now-1w/w`, `now-1M/M+12h`. Offsets without a
//! unit are seconds; `m` is minutes and `M` is months.
//!
//! Start bounds round down to the beginning of the rounding unit, end bounds
//! round up to its last second. All times are UTC.

use chrono::{
    DateTime, Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike, Utc,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

/// Time period parsing errors.
#[derive(Error, Debug, PartialEq)]
pub enum TimePeriodError {
    #[error("invalid time \"{0}\"")]
    Invalid(String),
    #[error("time \"{0}\" is out of range")]
    OutOfRange(String),
}

/// Start and end of the requested data window, in unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimePeriod {
    pub time_from: i64,
    pub time_to: i64,
}

impl TimePeriod {
    pub fn new(time_from: i64, time_to: i64) -> Self {
        Self { time_from, time_to }
    }

    /// Parse a `from`/`to` pair relative to `now`.
    pub fn parse(from: &str, to: &str, now: DateTime<Utc>) -> Result<Self, TimePeriodError> {
        Ok(Self {
            time_from: parse_time(from, true, now)?,
            time_to: parse_time(to, false, now)?,
        })
    }

    /// Length of the window in seconds.
    pub fn interval(&self) -> i64 {
        self.time_to - self.time_from
    }
}

fn relative_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:([+-])([0-9]+)([smhdwMy]?)|/([smhdwMy]))").expect("valid relative time regex")
    })
}

/// Parse a single time bound into a unix timestamp.
pub fn parse_time(input: &str, is_start: bool, now: DateTime<Utc>) -> Result<i64, TimePeriodError> {
    let value = input.trim();

    let dt = match value.strip_prefix("now") {
        Some(rest) => parse_relative(value, rest, is_start, now.naive_utc())?,
        None => parse_absolute(value, is_start)?,
    };

    Ok(dt.and_utc().timestamp())
}

fn parse_relative(
    input: &str,
    mut rest: &str,
    is_start: bool,
    now: NaiveDateTime,
) -> Result<NaiveDateTime, TimePeriodError> {
    let invalid = || TimePeriodError::Invalid(input.to_string());
    let out_of_range = || TimePeriodError::OutOfRange(input.to_string());

    let mut dt = now.with_nanosecond(0).ok_or_else(invalid)?;

    while !rest.is_empty() {
        let caps = relative_token_regex().captures(rest).ok_or_else(invalid)?;

        if let Some(unit) = caps.get(4) {
            let unit = unit_char(unit.as_str()).ok_or_else(invalid)?;
            dt = if is_start {
                round_down(dt, unit)
            } else {
                round_up(dt, unit)
            }
            .ok_or_else(out_of_range)?;
        } else {
            let amount: i64 = caps[2].parse().map_err(|_| out_of_range())?;
            let amount = if &caps[1] == "-" { -amount } else { amount };
            let unit = unit_char(&caps[3]).unwrap_or('s');
            dt = shift(dt, unit, amount).ok_or_else(out_of_range)?;
        }

        rest = &rest[caps[0].len()..];
    }

    Ok(dt)
}

fn parse_absolute(input: &str, is_start: bool) -> Result<NaiveDateTime, TimePeriodError> {
    let invalid = || TimePeriodError::Invalid(input.to_string());

    if let Ok(dt) = NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt);
    }

    let (start, unit) = if let Ok(dt) = NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M") {
        (dt, 'm')
    } else if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        (date.and_time(NaiveTime::MIN), 'd')
    } else if let Ok(date) = NaiveDate::parse_from_str(&format!("{}-01", input), "%Y-%m-%d") {
        (date.and_time(NaiveTime::MIN), 'M')
    } else {
        return Err(invalid());
    };

    if is_start {
        Ok(start)
    } else {
        round_up(start, unit).ok_or_else(|| TimePeriodError::OutOfRange(input.to_string()))
    }
}

fn unit_char(unit: &str) -> Option<char> {
    let mut chars = unit.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// Move `dt` by `amount` units.
fn shift(dt: NaiveDateTime, unit: char, amount: i64) -> Option<NaiveDateTime> {
    let seconds = match unit {
        's' => 1,
        'm' => 60,
        'h' => 3600,
        'd' => 86400,
        'w' => 7 * 86400,
        'M' => return shift_months(dt, amount),
        'y' => return shift_months(dt, amount.checked_mul(12)?),
        _ => return None,
    };

    dt.checked_add_signed(TimeDelta::try_seconds(amount.checked_mul(seconds)?)?)
}

fn shift_months(dt: NaiveDateTime, months: i64) -> Option<NaiveDateTime> {
    let count = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        dt.checked_add_months(count)
    } else {
        dt.checked_sub_months(count)
    }
}

/// Beginning of the `unit` containing `dt`. Weeks start on Monday.
fn round_down(dt: NaiveDateTime, unit: char) -> Option<NaiveDateTime> {
    let date = dt.date();
    match unit {
        's' => Some(dt),
        'm' => date.and_hms_opt(dt.hour(), dt.minute(), 0),
        'h' => date.and_hms_opt(dt.hour(), 0, 0),
        'd' => Some(date.and_time(NaiveTime::MIN)),
        'w' => {
            let monday = date
                .checked_sub_signed(TimeDelta::days(date.weekday().num_days_from_monday() as i64))?;
            Some(monday.and_time(NaiveTime::MIN))
        }
        'M' => NaiveDate::from_ymd_opt(date.year(), date.month(), 1).map(|d| d.and_time(NaiveTime::MIN)),
        'y' => NaiveDate::from_ymd_opt(date.year(), 1, 1).map(|d| d.and_time(NaiveTime::MIN)),
        _ => None,
    }
}

/// Last second of the `unit` containing `dt`.
fn round_up(dt: NaiveDateTime, unit: char) -> Option<NaiveDateTime> {
    let start = round_down(dt, unit)?;
    shift(start, unit, 1)?.checked_sub_signed(TimeDelta::seconds(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        // Wednesday
        Utc.with_ymd_and_hms(2024, 5, 15, 12, 34, 56).unwrap()
    }

    fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> i64 {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap().timestamp()
    }

    #[test]
    fn test_now_and_offsets() {
        let now = now();
        assert_eq!(parse_time("now", true, now), Ok(now.timestamp()));
        assert_eq!(parse_time("now-1h", true, now), Ok(ts(2024, 5, 15, 11, 34, 56)));
        assert_eq!(parse_time("now-30m", true, now), Ok(ts(2024, 5, 15, 12, 4, 56)));
        assert_eq!(parse_time("now-3600", true, now), Ok(ts(2024, 5, 15, 11, 34, 56)));
        assert_eq!(parse_time("now+1d", false, now), Ok(ts(2024, 5, 16, 12, 34, 56)));
        assert_eq!(parse_time("now-1M", true, now), Ok(ts(2024, 4, 15, 12, 34, 56)));
        assert_eq!(parse_time("now-1y", true, now), Ok(ts(2023, 5, 15, 12, 34, 56)));
    }

    #[test]
    fn test_rounding() {
        let now = now();
        assert_eq!(parse_time("now/d", true, now), Ok(ts(2024, 5, 15, 0, 0, 0)));
        assert_eq!(parse_time("now/d", false, now), Ok(ts(2024, 5, 15, 23, 59, 59)));
        assert_eq!(parse_time("now/w", true, now), Ok(ts(2024, 5, 13, 0, 0, 0)));
        assert_eq!(parse_time("now/w", false, now), Ok(ts(2024, 5, 19, 23, 59, 59)));
        assert_eq!(parse_time("now/M", false, now), Ok(ts(2024, 5, 31, 23, 59, 59)));
        assert_eq!(parse_time("now/y", true, now), Ok(ts(2024, 1, 1, 0, 0, 0)));
        assert_eq!(parse_time("now-1d/d", true, now), Ok(ts(2024, 5, 14, 0, 0, 0)));
        assert_eq!(parse_time("now-1d/d", false, now), Ok(ts(2024, 5, 14, 23, 59, 59)));
        assert_eq!(parse_time("now/h", true, now), Ok(ts(2024, 5, 15, 12, 0, 0)));
    }

    #[test]
    fn test_absolute() {
        let now = now();
        assert_eq!(
            parse_time("2024-01-02 03:04:05", true, now),
            Ok(ts(2024, 1, 2, 3, 4, 5))
        );
        assert_eq!(parse_time("2024-01-02 03:04", false, now), Ok(ts(2024, 1, 2, 3, 4, 59)));
        assert_eq!(parse_time("2024-01-02", true, now), Ok(ts(2024, 1, 2, 0, 0, 0)));
        assert_eq!(parse_time("2024-01-02", false, now), Ok(ts(2024, 1, 2, 23, 59, 59)));
        assert_eq!(parse_time("2024-02", false, now), Ok(ts(2024, 2, 29, 23, 59, 59)));
    }

    #[test]
    fn test_invalid() {
        let now = now();
        for value in ["", "yesterday", "now-", "now-1x", "now/q", "2024-13-01", "now 1h"] {
            assert_eq!(
                parse_time(value, true, now),
                Err(TimePeriodError::Invalid(value.trim().to_string())),
                "{value}"
            );
        }
        assert!(matches!(
            parse_time("now-99999999999999y", true, now),
            Err(TimePeriodError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_week_rounding_near_min_date() {
        assert!(matches!(
            parse_time("now-3170008M-14d/w", true, now()),
            Err(TimePeriodError::OutOfRange(_))
        ));
        assert!(matches!(
            parse_time("now-3170008M-14d/w", false, now()),
            Err(TimePeriodError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_period_parse() {
        let period = TimePeriod::parse("now-1h", "now", now()).unwrap();
        assert_eq!(period.interval(), 3600);
        assert_eq!(period.time_to, now().timestamp());
    }
}
