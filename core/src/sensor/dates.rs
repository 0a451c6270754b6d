//! Conversions between calendar stamps and the integer day numbers the engine works on.

use crate::prelude::ConfigError;
use chrono::{Datelike, NaiveDate};

/// `NaiveDate::num_days_from_ce` of 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

const STAMP_FORMATS: [&str; 2] = ["%Y%m%d", "%Y-%m-%d"];

/// Parses `YYYYMMDD` or `YYYY-MM-DD` into days since 1970-01-01.
pub fn parse_day(text: &str) -> Result<i32, ConfigError> {
    let trimmed = text.trim();
    STAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .map(|date| date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)
        .ok_or_else(|| ConfigError::InvalidDate(text.to_string()))
}

/// Formats a day number as `YYYYMMDD`. Days outside chrono's range print as plain integers.
pub fn format_day(day: i32) -> String {
    day.checked_add(UNIX_EPOCH_DAYS_FROM_CE)
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .map(|date| date.format("%Y%m%d").to_string())
        .unwrap_or_else(|| day.to_string())
}

/// `start, start + step, ...` up to and including `end`.
pub fn regular_days(start: i32, end: i32, step: i32) -> Vec<i32> {
    if step <= 0 || start > end {
        return Vec::new();
    }
    let span = (i64::from(end) - i64::from(start)) / i64::from(step);
    let mut days = Vec::with_capacity(span as usize + 1);
    let mut day = start;
    while day <= end {
        days.push(day);
        match day.checked_add(step) {
            Some(next) => day = next,
            None => break,
        }
    }
    days
}
