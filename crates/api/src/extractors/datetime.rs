//! Lenient instant parsing for payment and cancellation dates.
//!
//! Clients send either a full RFC 3339 timestamp or a bare `YYYY-MM-DD`
//! date, which is read as midnight UTC.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, de::Error};

/// Parses an RFC 3339 timestamp or a calendar date.
#[must_use]
pub fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.to_utc())
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        })
}

/// `deserialize_with` for a required instant.
pub fn instant<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_instant(&raw).ok_or_else(|| D::Error::custom(format!("invalid date: {raw}")))
}

/// `deserialize_with` for an optional instant.
pub fn optional_instant<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse_instant(&raw)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid date: {raw}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parses_timestamps_and_dates() {
        assert_eq!(
            parse_instant("2026-05-01T10:30:00+05:30"),
            Some(Utc.with_ymd_and_hms(2026, 5, 1, 5, 0, 0).unwrap())
        );
        assert_eq!(
            parse_instant("2026-05-01"),
            Some(Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_instant("yesterday"), None);
    }
}
