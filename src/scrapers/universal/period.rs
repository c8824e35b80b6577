//! Validity-period parsing for list rows.
//!
//! List rows usually carry a short fragment such as `2026.03.01 ~ 03.31`
//! or `26-03-01 - 26-03-31`. The first two date-like tokens are taken as
//! start and end.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::utils::{end_of_day, start_of_day};

static DATE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:(?:20)?(\d{2})[./-])?(\d{1,2})[./-](\d{1,2})").unwrap());

struct DateToken {
    year: Option<i32>,
    month: u32,
    day: u32,
}

fn tokens(text: &str) -> Vec<DateToken> {
    DATE_TOKEN
        .captures_iter(text)
        .filter_map(|caps| {
            Some(DateToken {
                year: caps
                    .get(1)
                    .and_then(|m| m.as_str().parse::<i32>().ok())
                    .map(|yy| 2000 + yy),
                month: caps.get(2)?.as_str().parse().ok()?,
                day: caps.get(3)?.as_str().parse().ok()?,
            })
        })
        .collect()
}

/// Parse a period fragment into a start (midnight) and end (23:59:59).
///
/// Tokens without a year use `current_year`. When neither token has a
/// year and the end month precedes the start month, the period wraps
/// into the next year. Returns `(None, None)` unless two valid dates
/// are found.
pub fn parse_event_period(
    text: &str,
    current_year: i32,
) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    let found = tokens(text);
    let [start, end, ..] = found.as_slice() else {
        return (None, None);
    };

    let start_year = start.year.unwrap_or(current_year);
    let mut end_year = end.year.unwrap_or(current_year);
    if start.year.is_none() && end.year.is_none() && start.month > end.month {
        end_year += 1;
    }

    match (
        start_of_day(start_year, start.month, start.day),
        end_of_day(end_year, end.month, end.day),
    ) {
        (Some(s), Some(e)) => (Some(s), Some(e)),
        _ => (None, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_full_dates() {
        let (start, end) = parse_event_period("2026.01.10 ~ 2026.01.20", 2025);
        assert_eq!(start, Some(utc(2026, 1, 10, 0, 0, 0)));
        assert_eq!(end, Some(utc(2026, 1, 20, 23, 59, 59)));
    }

    #[test]
    fn test_two_digit_years() {
        let (start, end) = parse_event_period("기간: 26-03-01 - 26-03-31", 2020);
        assert_eq!(start, Some(utc(2026, 3, 1, 0, 0, 0)));
        assert_eq!(end, Some(utc(2026, 3, 31, 23, 59, 59)));
    }

    #[test]
    fn test_yearless_period_wraps_year() {
        let (start, end) = parse_event_period("12.20 ~ 01.05", 2025);
        assert_eq!(start, Some(utc(2025, 12, 20, 0, 0, 0)));
        assert_eq!(end, Some(utc(2026, 1, 5, 23, 59, 59)));
    }

    #[test]
    fn test_mixed_year_does_not_wrap() {
        let (_, end) = parse_event_period("2025.12.20 ~ 01.05", 2025);
        assert_eq!(end, Some(utc(2025, 1, 5, 23, 59, 59)));
    }

    #[test]
    fn test_single_or_invalid_dates() {
        assert_eq!(parse_event_period("03.01 부터", 2026), (None, None));
        assert_eq!(parse_event_period("02.30 ~ 03.01", 2026), (None, None));
        assert_eq!(parse_event_period("", 2026), (None, None));
    }
}
