//! Time utility functions
//!
//! All timestamps handled by the engine are UTC instants.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

/// Convert microseconds since Unix epoch to DateTime<Utc>
pub fn micros_to_datetime(micros: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_micros(micros).unwrap_or_else(|| {
        tracing::warn!(micros, "Invalid timestamp, using epoch");
        DateTime::UNIX_EPOCH
    })
}

/// Floor a timestamp to 00:00:00 UTC of the same day
pub fn start_of_day(ts: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(&ts.date_naive().and_time(NaiveTime::MIN))
}

/// Parse a user-supplied timestamp.
///
/// Accepts RFC 3339 (`2024-01-15T10:30:00Z`, offsets are converted to UTC) or a
/// bare date (`2024-01-15`, read as midnight UTC).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|d| Utc.from_utc_datetime(&d.and_time(NaiveTime::MIN)))
}
