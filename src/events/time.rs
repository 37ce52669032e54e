// Copyright (c) 2025 - Cowboy AI, Inc.
//! ISO 8601 event timestamps
//!
//! Timestamps are written as RFC 3339 in UTC with a `Z` suffix. Reading is
//! more lenient: extended (`2026-01-19T12:00:00`) and basic
//! (`20260119T120000`) ISO 8601 forms are accepted down to hour precision,
//! with a `Z`, `±hh`, `±hhmm` or `±hh:mm` offset. Values without an offset
//! are taken as UTC.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, SecondsFormat, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer, Serializer};

const EXTENDED_TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];

/// Parse an ISO 8601 instant
pub fn parse_iso8601(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(time) = DateTime::parse_from_rfc3339(value) {
        return Ok(time.with_timezone(&Utc));
    }
    parse_lenient(value).ok_or_else(|| format!("{value:?} is not an ISO 8601 timestamp"))
}

fn parse_lenient(value: &str) -> Option<DateTime<Utc>> {
    let (date, clock) = match value.split_once('T') {
        Some((date, clock)) => (date, Some(clock)),
        None => (value, None),
    };
    let date = parse_date(date)?;

    let Some(clock) = clock else {
        return date.and_hms_opt(0, 0, 0).map(|naive| Utc.from_utc_datetime(&naive));
    };
    let (clock, offset) = split_offset(clock)?;
    let local = date.and_time(parse_clock(clock)?);
    offset
        .from_local_datetime(&local)
        .single()
        .map(|time| time.with_timezone(&Utc))
}

fn parse_date(date: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        return Some(date);
    }
    if date.len() != 8 || !date.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::from_ymd_opt(
        date[..4].parse().ok()?,
        date[4..6].parse().ok()?,
        date[6..].parse().ok()?,
    )
}

/// Split `12:00:00+01:00` into the clock and its offset; no offset means UTC
fn split_offset(clock: &str) -> Option<(&str, FixedOffset)> {
    if let Some(clock) = clock.strip_suffix(|c: char| c == 'Z' || c == 'z') {
        return Some((clock, FixedOffset::east_opt(0)?));
    }
    let Some(at) = clock.rfind(|c: char| c == '+' || c == '-') else {
        return Some((clock, FixedOffset::east_opt(0)?));
    };

    let (clock, offset) = clock.split_at(at);
    let sign = if offset.starts_with('-') { -1 } else { 1 };
    let digits = offset[1..].replacen(':', "", 1);
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes): (i32, i32) = match digits.len() {
        2 => (digits.parse().ok()?, 0),
        4 => (digits[..2].parse().ok()?, digits[2..].parse().ok()?),
        _ => return None,
    };
    if minutes >= 60 {
        return None;
    }
    Some((clock, FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))?))
}

fn parse_clock(clock: &str) -> Option<NaiveTime> {
    if clock.contains(':') {
        return EXTENDED_TIME_FORMATS
            .iter()
            .find_map(|format| NaiveTime::parse_from_str(clock, format).ok());
    }

    let whole = clock.split(|c: char| c == '.' || c == ',').next().unwrap_or(clock);
    if !whole.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match whole.len() {
        2 => NaiveTime::from_hms_opt(clock.parse().ok()?, 0, 0),
        4 => NaiveTime::parse_from_str(clock, "%H%M").ok(),
        6 => NaiveTime::parse_from_str(&clock.replacen(',', ".", 1), "%H%M%S%.f").ok(),
        _ => None,
    }
}

/// Render an instant the way events store it
pub fn format_iso8601(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub fn serialize<S>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_iso8601(time))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    parse_iso8601(&value).map_err(de::Error::custom)
}
