//! Instant handling.
//!
//! Every instant is a `DateTime<Utc>` from the moment it leaves the wire. Conversion
//! to the viewer's zone happens only in [`format_local`].

use chrono::{DateTime, Local, TimeDelta, Utc};

/// Parse an ISO-8601 / RFC 3339 timestamp into a UTC instant.
///
/// The backend sometimes omits the offset (`2024-05-01T10:00:00`); such values are
/// taken to be UTC.
pub fn parse_instant(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    let raw = raw.trim();
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(e) => chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|_| e),
    }
}

/// Format a remaining duration as `HH:MM:SS`.
///
/// Negative durations render as `00:00:00`. Hours are never truncated, so
/// 100 hours renders as `100:00:00`.
pub fn format_remaining(remaining: TimeDelta) -> String {
    let total = remaining.num_seconds().max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Render an instant in the local time zone, e.g. `May 1, 2024, 12:00 PM +02:00`.
pub fn format_local(instant: DateTime<Utc>) -> String {
    instant
        .with_timezone(&Local)
        .format("%b %-d, %Y, %I:%M %p %:z")
        .to_string()
}
