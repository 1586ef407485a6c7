//! Date and time utility functions
//!
//! Helpers for the week-based dates and wall-clock times carried by
//! timesheet, shift, absence and preset attributes.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};

/// Date format used on the wire and in configuration files
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Wall-clock format used for shift and preset times
pub const TIME_FORMAT: &str = "%H:%M";

/// Parse a date string in YYYY-MM-DD format to NaiveDate
pub fn parse_date(date_str: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(date_str, DATE_FORMAT)
}

/// Format a NaiveDate to YYYY-MM-DD string
pub fn format_ymd(d: NaiveDate) -> String {
    d.format(DATE_FORMAT).to_string()
}

/// Parse a wall-clock time, accepting both `HH:MM` and `HH:MM:SS`
pub fn parse_time(time_str: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(time_str, TIME_FORMAT).or_else(|_| NaiveTime::parse_from_str(time_str, "%H:%M:%S"))
}

/// Format a NaiveTime as `HH:MM`
pub fn format_hm(t: NaiveTime) -> String {
    t.format(TIME_FORMAT).to_string()
}

/// Monday of the week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Whether `date` is the first day (Monday) of its week
pub fn is_week_start(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Mon
}

/// Whether `date` falls inside the week starting on `week_start`
pub fn in_week(date: NaiveDate, week_start: NaiveDate) -> bool {
    let days = (date - week_start).num_days();
    (0..7).contains(&days)
}

/// Minutes from `start` to `end`; negative when `end` is not after `start`
pub fn minutes_between(start: NaiveTime, end: NaiveTime) -> i64 {
    (end - start).num_minutes()
}

/// Serde adapter for `NaiveTime` fields stored as `HH:MM`
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_hm(*time))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_time(&raw).map_err(|e| de::Error::custom(format!("invalid time '{raw}': {e}")))
    }
}
