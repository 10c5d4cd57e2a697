//! Serde helpers for optional subscription timestamps.
//!
//! Backends emit either RFC 3339 strings or naive ISO-8601 strings without an
//! offset; naive values are read as UTC. Output is always RFC 3339.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer};

const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub fn parse(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, NAIVE_FORMAT).map(|n| n.and_utc()))
}

pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(ts) => serializer.serialize_some(&ts.to_rfc3339()),
        None => serializer.serialize_none(),
    }
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.filter(|s| !s.trim().is_empty())
        .map(|s| parse(s.trim()).map_err(serde::de::Error::custom))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_rfc3339_with_offset() {
        let ts = parse("2026-01-02T03:04:05+03:00").unwrap();
        assert_eq!(ts.hour(), 0);
        assert_eq!(ts.day(), 2);
    }

    #[test]
    fn parses_naive_iso_as_utc() {
        let ts = parse("2026-01-02T03:04:05.123456").unwrap();
        assert_eq!(ts.hour(), 3);
        assert_eq!(ts.year(), 2026);
        assert!(parse("2026-01-02T03:04:05").is_ok());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse("next tuesday").is_err());
    }
}
