//! Shared utility functions for the epidemic forecast dashboard crates.

/// Date utility functions
pub mod dates {
    use crate::error::DateError;
    use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeDelta, Utc};

    /// Calendar date format used by every source file: "YYYY-MM-DD"
    pub const DATE_FORMAT: &str = "%Y-%m-%d";

    /// Number of days in one reporting week.
    pub const DAYS_PER_WEEK: i64 = 7;

    /// Month (August) in which an epidemiological season starts.
    pub const SEASON_START_MONTH: u32 = 8;

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_date(date: &NaiveDate) -> String {
        date.format(DATE_FORMAT).to_string()
    }

    /// Parse a calendar date.
    ///
    /// Plain `YYYY-MM-DD` is the normal case. Full timestamps are accepted too
    /// and collapse to their UTC calendar day, so `2024-01-06T23:30:00-05:00`
    /// becomes 2024-01-07.
    pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
        let s = s.trim();
        if let Ok(date) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
            return Ok(date);
        }
        if let Ok(instant) = DateTime::parse_from_rfc3339(s) {
            return Ok(instant.with_timezone(&Utc).date_naive());
        }
        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
                return Ok(naive.date());
            }
        }
        Err(DateError(format!("unrecognized date '{}'", s)).into())
    }

    /// The Saturday that closes the reporting week containing `date`,
    /// counting backwards (a Saturday maps to itself).
    pub fn saturday_on_or_before(date: &NaiveDate) -> NaiveDate {
        let back = (date.weekday().num_days_from_sunday() + 1) % 7;
        *date - TimeDelta::days(back as i64)
    }

    /// Shift a date by a whole number of weeks. `None` when the result is
    /// outside the representable calendar.
    pub fn add_weeks(date: &NaiveDate, weeks: i64) -> Option<NaiveDate> {
        let days = weeks.checked_mul(DAYS_PER_WEEK)?;
        date.checked_add_signed(TimeDelta::try_days(days)?)
    }

    /// Whole weeks between two dates, rounded to the nearest week.
    pub fn weeks_between(start: &NaiveDate, end: &NaiveDate) -> i64 {
        let days = (*end - *start).num_days() as f64;
        (days / DAYS_PER_WEEK as f64).round() as i64
    }

    /// Nominal (unclipped) bounds of a season year: Aug 1 of the previous
    /// year through Jul 31 of `season_year`.
    pub fn season_bounds(season_year: i32) -> Option<(NaiveDate, NaiveDate)> {
        let start = NaiveDate::from_ymd_opt(season_year - 1, SEASON_START_MONTH, 1)?;
        let end = NaiveDate::from_ymd_opt(season_year, SEASON_START_MONTH - 1, 31)?;
        Some((start, end))
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use chrono::{NaiveDate, Weekday};

        fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
            NaiveDate::from_ymd_opt(y, m, d).unwrap()
        }

        #[test]
        fn test_format_and_parse() {
            let date = ymd(2023, 6, 15);
            let formatted = format_date(&date);
            assert_eq!(formatted, "2023-06-15");
            let parsed = parse_date(&formatted).unwrap();
            assert_eq!(parsed, date);
        }

        #[test]
        fn test_parse_timestamps_normalize_to_utc_day() {
            assert_eq!(parse_date("2024-01-06T00:00:00Z").unwrap(), ymd(2024, 1, 6));
            assert_eq!(parse_date("2024-01-06T23:30:00-05:00").unwrap(), ymd(2024, 1, 7));
            assert_eq!(parse_date("2024-01-06T12:00:00").unwrap(), ymd(2024, 1, 6));
            assert_eq!(parse_date(" 2024-01-06 ").unwrap(), ymd(2024, 1, 6));
        }

        #[test]
        fn test_parse_rejects_garbage() {
            assert!(parse_date("").is_err());
            assert!(parse_date("01/06/2024").is_err());
            assert!(parse_date("2024-02-30").is_err());
        }

        #[test]
        fn test_saturday_on_or_before() {
            let saturday = ymd(2024, 1, 6);
            assert_eq!(saturday.weekday(), Weekday::Sat);
            assert_eq!(saturday_on_or_before(&saturday), saturday);
            assert_eq!(saturday_on_or_before(&ymd(2024, 1, 7)), saturday);
            assert_eq!(saturday_on_or_before(&ymd(2024, 1, 12)), saturday);
            assert_eq!(saturday_on_or_before(&ymd(2024, 1, 13)), ymd(2024, 1, 13));
        }

        #[test]
        fn test_weeks_between() {
            let start = ymd(2024, 1, 6);
            assert_eq!(weeks_between(&start, &ymd(2024, 1, 20)), 2);
            assert_eq!(weeks_between(&start, &ymd(2024, 1, 19)), 2);
            assert_eq!(weeks_between(&start, &start), 0);
            assert_eq!(add_weeks(&start, 3), Some(ymd(2024, 1, 27)));
            assert_eq!(add_weeks(&start, -1), Some(ymd(2023, 12, 30)));
        }

        #[test]
        fn test_add_weeks_out_of_range() {
            let start = ymd(2024, 1, 6);
            assert_eq!(add_weeks(&start, i64::from(u32::MAX)), None);
            assert_eq!(add_weeks(&start, i64::MAX), None);
            assert_eq!(add_weeks(&NaiveDate::MIN, -1), None);
        }

        #[test]
        fn test_season_bounds() {
            let (start, end) = season_bounds(2024).unwrap();
            assert_eq!(start, ymd(2023, 8, 1));
            assert_eq!(end, ymd(2024, 7, 31));
        }
    }
}

/// Error types
pub mod error {
    use std::fmt;

    #[derive(Debug)]
    pub struct DateError(pub String);

    impl fmt::Display for DateError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "Date error: {}", self.0)
        }
    }

    impl std::error::Error for DateError {}
}
