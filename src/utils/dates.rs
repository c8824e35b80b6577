//! Calendar date helpers.

use chrono::{DateTime, NaiveDate, Utc};

/// Midnight UTC of the given day, or `None` for an invalid date.
pub fn start_of_day(year: i32, month: u32, day: u32) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, month, day)?
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
}

/// 23:59:59 UTC of the given day, or `None` for an invalid date.
pub fn end_of_day(year: i32, month: u32, day: u32) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, month, day)?
        .and_hms_opt(23, 59, 59)
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_bounds() {
        assert_eq!(
            start_of_day(2026, 1, 10).unwrap().to_rfc3339(),
            "2026-01-10T00:00:00+00:00"
        );
        assert_eq!(
            end_of_day(2026, 1, 20).unwrap().to_rfc3339(),
            "2026-01-20T23:59:59+00:00"
        );
        assert!(end_of_day(2026, 2, 30).is_none());
        assert!(start_of_day(2026, 13, 1).is_none());
    }
}
