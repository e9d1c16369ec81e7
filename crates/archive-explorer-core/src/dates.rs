//! Date parsing and display helpers for archive records.
//!
//! Record dates arrive as loosely formatted strings or millisecond
//! timestamps. Nothing here panics on bad input: unreadable dates come back
//! as `None` or as the locale's "Unknown" text. Dates are shown in the
//! wall-clock time they were written with; naive values are taken as UTC.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::locale::Locale;
use crate::models::{Record, RecordDate};

const NAIVE_DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Parse a record date into a timestamp with offset.
pub fn parse_record_date(date: &RecordDate) -> Option<DateTime<FixedOffset>> {
    match date {
        RecordDate::Text(s) => parse_text(s),
        RecordDate::Timestamp(ms) => from_millis(*ms),
        RecordDate::Other(Value::String(s)) => parse_text(s),
        RecordDate::Other(Value::Number(n)) => n.as_i64().and_then(from_millis),
        RecordDate::Other(_) => None,
    }
}

fn from_millis(ms: i64) -> Option<DateTime<FixedOffset>> {
    DateTime::from_timestamp_millis(ms).map(|dt| dt.fixed_offset())
}

fn parse_text(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc().fixed_offset());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Display pieces for a record date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedDate {
    /// `YYYY-<short month>-DD`, or the locale's "Unknown".
    pub formatted: String,
    pub day_name: String,
    pub year: Option<i32>,
    pub month: String,
    /// Zero-padded day of month.
    pub day: String,
}

/// Format a record date for cards.
///
/// A missing date shows the current time; an unreadable one shows
/// "Unknown".
pub fn format_archive_date(date: Option<&RecordDate>, locale: Locale) -> FormattedDate {
    match date {
        None => format_parsed(Utc::now().fixed_offset(), locale),
        Some(d) => match parse_record_date(d) {
            Some(dt) => format_parsed(dt, locale),
            None => FormattedDate {
                formatted: locale.unknown().to_string(),
                day_name: locale.unknown().to_string(),
                year: None,
                month: String::new(),
                day: String::new(),
            },
        },
    }
}

fn format_parsed(dt: DateTime<FixedOffset>, locale: Locale) -> FormattedDate {
    let year = dt.year();
    let month = locale.month_short(dt.month()).to_string();
    let day = format!("{:02}", dt.day());
    FormattedDate {
        formatted: format!("{}-{}-{}", year, month, day),
        day_name: locale.weekday(dt.weekday().num_days_from_monday()).to_string(),
        year: Some(year),
        month,
        day,
    }
}

pub fn year_of(record: &Record) -> Option<i32> {
    record.date.as_ref().and_then(parse_record_date).map(|dt| dt.year())
}

/// Calendar day of a record, used to group records per day.
pub fn date_key(record: &Record) -> Option<NaiveDate> {
    record
        .date
        .as_ref()
        .and_then(parse_record_date)
        .map(|dt| dt.date_naive())
}

/// `HH:MM` of a record date.
pub fn format_time(date: &RecordDate) -> Option<String> {
    parse_record_date(date).map(|dt| format!("{:02}:{:02}", dt.hour(), dt.minute()))
}

/// `M:SS` for a duration in seconds.
pub fn format_duration(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
