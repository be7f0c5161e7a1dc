//! Time helpers for the business timezone
//!
//! Dates are turned into timestamps in the service layer; repositories only
//! see `i64` Unix millis.

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use chrono_tz::Tz;
use shared::error::{AppError, AppResult, ErrorCode};

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
        AppError::with_message(ErrorCode::InvalidFormat, format!("Invalid date format: {}", date))
            .with_detail("date", date)
    })
}

/// Local wall-clock time → Unix millis
///
/// A local time inside a DST gap falls back to UTC.
fn local_to_millis(naive: NaiveDateTime, tz: Tz) -> i64 {
    naive
        .and_local_timezone(tz)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// Start of `date` (00:00:00) as Unix millis
pub fn day_start_millis(date: NaiveDate, tz: Tz) -> i64 {
    local_to_millis(date.and_time(NaiveTime::MIN), tz)
}

/// 00:00:00 of the following day as Unix millis, exclusive
pub fn day_end_exclusive_millis(date: NaiveDate, tz: Tz) -> i64 {
    let next_day = date.succ_opt().unwrap_or(date);
    day_start_millis(next_day, tz)
}

/// Unix millis → local wall-clock time in the business timezone
pub fn to_local(millis: i64, tz: Tz) -> DateTime<Tz> {
    DateTime::from_timestamp_millis(millis)
        .unwrap_or_default()
        .with_timezone(&tz)
}

/// Hour of day (0-23) in the business timezone
pub fn hour_of_day(millis: i64, tz: Tz) -> u32 {
    to_local(millis, tz).hour()
}

/// Calendar date of `millis` in the business timezone
pub fn business_date(millis: i64, tz: Tz) -> NaiveDate {
    to_local(millis, tz).date_naive()
}

/// Inclusive date window `[start 00:00:00.000, end 23:59:59.999]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub start_millis: i64,
    /// Last millisecond still inside the window
    pub end_millis: i64,
}

impl ReportWindow {
    pub fn new(start: NaiveDate, end: NaiveDate, tz: Tz) -> AppResult<Self> {
        if end < start {
            return Err(AppError::with_message(
                ErrorCode::ValueOutOfRange,
                format!("End date {} is before start date {}", end, start),
            ));
        }
        Ok(Self {
            start,
            end,
            start_millis: day_start_millis(start, tz),
            end_millis: day_end_exclusive_millis(end, tz) - 1,
        })
    }

    pub fn single_day(date: NaiveDate, tz: Tz) -> Self {
        Self {
            start: date,
            end: date,
            start_millis: day_start_millis(date, tz),
            end_millis: day_end_exclusive_millis(date, tz) - 1,
        }
    }

    /// Seven days starting at `start`
    pub fn week_from(start: NaiveDate, tz: Tz) -> AppResult<Self> {
        let end = start.checked_add_days(Days::new(6)).ok_or_else(|| {
            AppError::with_message(ErrorCode::ValueOutOfRange, format!("Date out of range: {}", start))
        })?;
        Self::new(start, end, tz)
    }

    pub fn contains(&self, millis: i64) -> bool {
        millis >= self.start_millis && millis <= self.end_millis
    }

    pub fn start_label(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    pub fn end_label(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert!(parse_date("2024-13-01").is_err());
        assert!(parse_date("yesterday").unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_window_bounds_utc() {
        let window = ReportWindow::new(date("2024-03-01"), date("2024-03-02"), Tz::UTC).unwrap();
        assert_eq!(window.start_millis, 1_709_251_200_000);
        // 2024-03-03T00:00:00Z - 1ms
        assert_eq!(window.end_millis, 1_709_424_000_000 - 1);
        assert!(window.contains(window.end_millis));
        assert!(!window.contains(window.end_millis + 1));
        assert!(!window.contains(window.start_millis - 1));
    }

    #[test]
    fn test_window_in_business_timezone() {
        let tz: Tz = "Europe/Madrid".parse().unwrap();
        let window = ReportWindow::single_day(date("2024-01-15"), tz);
        // Madrid is UTC+1 in January
        assert_eq!(window.start_millis, 1_705_273_200_000);
        assert_eq!(hour_of_day(window.start_millis, tz), 0);
        assert_eq!(hour_of_day(window.start_millis, Tz::UTC), 23);
    }

    #[test]
    fn test_reversed_window_rejected() {
        let err = ReportWindow::new(date("2024-03-02"), date("2024-03-01"), Tz::UTC).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_week_from() {
        let window = ReportWindow::week_from(date("2024-02-26"), Tz::UTC).unwrap();
        assert_eq!(window.end_label(), "2024-03-03");
        assert_eq!(window.start_label(), "2024-02-26");
    }
}
