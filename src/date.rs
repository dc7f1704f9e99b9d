//! Timestamp parsing for comment/post dates and the small amount of arithmetic
//! the engine needs (second-precision formatting, clamped elapsed time).

use serde_json::Value;
use std::time::Duration;
use time::format_description::well_known::Rfc3339;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

const NAIVE_FORMATS: &[&[FormatItem<'static>]] = &[
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]"),
];

const DATE_ONLY: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");
const COMPACT_DATE: &[FormatItem<'static>] = format_description!("[year][month][day]");
const SECOND_FMT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Parse a timestamp string. Returns `None` for anything unrecognised;
/// callers treat that as "invalid", never as a default instant.
///
/// Accepted: RFC 3339, naive `YYYY-MM-DD[ T]HH:MM:SS[.fff]` (UTC),
/// `YYYY-MM-DD HH:MM`, `YYYY-MM-DD`, compact `YYYYMMDD`, and unix seconds
/// written with at least 9 digits.
pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if s.bytes().all(|b| b.is_ascii_digit()) {
        return match s.len() {
            8 => Date::parse(s, COMPACT_DATE).ok().map(|d| d.midnight().assume_utc()),
            9.. => s.parse::<i64>().ok().and_then(from_epoch),
            _ => None,
        };
    }
    if let Ok(dt) = OffsetDateTime::parse(s, &Rfc3339) {
        return Some(dt);
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = PrimitiveDateTime::parse(s, *fmt) {
            return Some(dt.assume_utc());
        }
    }
    Date::parse(s, DATE_ONLY).ok().map(|d| d.midnight().assume_utc())
}

/// Parse a timestamp cell: strings go through `parse_timestamp`, integral
/// numbers are unix seconds, everything else (null, bool, ...) is invalid.
pub fn timestamp_from_value(v: &Value) -> Option<OffsetDateTime> {
    match v {
        Value::String(s) => parse_timestamp(s),
        Value::Number(n) => n.as_i64().and_then(from_epoch),
        _ => None,
    }
}

fn from_epoch(secs: i64) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp(secs).ok()
}

/// `YYYY-MM-DD HH:MM:SS` in UTC; fractional seconds are dropped.
pub fn format_second(ts: OffsetDateTime) -> String {
    let utc = ts.to_offset(time::UtcOffset::UTC);
    utc.format(SECOND_FMT)
        .unwrap_or_else(|_| utc.unix_timestamp().to_string())
}

/// `max(0, child - root)` floored to whole seconds.
pub fn elapsed_floor(root: OffsetDateTime, child: OffsetDateTime) -> Duration {
    let delta = child - root;
    if delta.is_negative() {
        return Duration::ZERO;
    }
    Duration::from_secs(delta.whole_seconds() as u64)
}

/// Render a duration the way pandas writes a Timedelta: `"0 days 00:10:00"`.
pub fn format_duration_human(d: Duration) -> String {
    let total = d.as_secs();
    let days = total / 86_400;
    let rem = total % 86_400;
    format!("{} days {:02}:{:02}:{:02}", days, rem / 3600, (rem % 3600) / 60, rem % 60)
}
