//! Timestamp parsing for the formats the API produces and accepts.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

/// Wire format used when sending event dates to the API.
pub const WIRE_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const WIRE_DATE_FORMAT: &str = "%Y-%m-%d";

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse an API timestamp into wall-clock time.
///
/// RFC 3339 values keep the wall clock of their own offset; a bare
/// YYYY-MM-DD is midnight of that day.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, String> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_local());
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt);
        }
    }

    parse_date(s).map(|d| d.and_time(NaiveTime::MIN))
}

/// Parse YYYY-MM-DD, also accepting a full timestamp and keeping its date.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, WIRE_DATE_FORMAT) {
        return Ok(date);
    }

    // Some backends serialize date columns as midnight timestamps
    match s.split_once(['T', ' ']) {
        Some((date, _)) => NaiveDate::parse_from_str(date, WIRE_DATE_FORMAT)
            .map_err(|_| format!("Invalid date '{}'. Expected YYYY-MM-DD", s)),
        None => Err(format!("Invalid date '{}'. Expected YYYY-MM-DD", s)),
    }
}

/// The full-day span of a date: 00:00:00 to 23:59:59.
pub fn day_span(date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = date.and_time(NaiveTime::MIN);
    let end = date.and_hms_opt(23, 59, 59).unwrap_or(start);
    (start, end)
}
