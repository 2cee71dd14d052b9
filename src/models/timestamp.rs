// Server timestamp parsing and report formatting.
// InfluxQL returns RFC3339 with up to nanosecond digits; reports carry microseconds.

use chrono::{DateTime, NaiveDateTime, TimeZone, Timelike, Utc};
use std::fmt;

/// `YYYY-MM-DD HH:MM:SS.ffffff`, used for every time column in console and CSV output.
pub const REPORT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid timestamp {raw:?}")]
pub struct TimestampParseError {
    pub raw: String,
}

impl TimestampParseError {
    fn new(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
        }
    }
}

/// Parses a timestamp as emitted in an InfluxQL JSON response.
/// Values without zone information are taken as UTC. Sub-microsecond digits are dropped.
pub fn parse_influx_timestamp(raw: &str) -> Result<DateTime<Utc>, TimestampParseError> {
    let s = raw.trim();
    let parsed = match DateTime::parse_from_rfc3339(s) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(_) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .map_err(|_| TimestampParseError::new(raw))?
            .and_utc(),
    };
    Ok(truncate_to_micros(parsed))
}

/// Parses a value previously written with [`REPORT_FORMAT`] back into a UTC instant.
pub fn parse_report_timestamp(s: &str) -> Result<DateTime<Utc>, TimestampParseError> {
    NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%d %H:%M:%S%.f")
        .map(|n| n.and_utc())
        .map_err(|_| TimestampParseError::new(s))
}

pub fn truncate_to_micros(ts: DateTime<Utc>) -> DateTime<Utc> {
    let micros = ts.nanosecond() / 1_000;
    ts.with_nanosecond(micros * 1_000).unwrap_or(ts)
}

pub fn format_timestamp<Tz>(ts: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    ts.format(REPORT_FORMAT).to_string()
}

/// (UTC, local) rendering of one instant.
pub fn format_utc_and_local<Tz>(ts: &DateTime<Utc>, tz: &Tz) -> (String, String)
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    (
        format_timestamp(ts),
        format_timestamp(&ts.with_timezone(tz)),
    )
}
