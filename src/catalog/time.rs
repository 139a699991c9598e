use std::fmt::Display;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

/// Format a creation timestamp as 24-hour `HH:MM` in `tz`.
///
/// Accepts RFC 3339 (`2023-08-10T06:10:57.194Z`) and naive ISO timestamps,
/// which are taken as UTC. Returns `None` when the input cannot be parsed.
pub fn format_created<Tz>(raw: &str, tz: &Tz) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let raw = raw.trim();
    let utc = match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(_) => NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()?
            .and_utc(),
    };

    Some(utc.with_timezone(tz).format("%H:%M").to_string())
}
