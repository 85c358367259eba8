//! Lenient date/time text parsing.
//!
//! Tries a fixed sequence of layouts and keeps the first that matches.
//! Text without an offset is read as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const OFFSET_LAYOUTS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

const DATETIME_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%d %b %Y %H:%M:%S",
    "%b %d, %Y %H:%M:%S",
    "%B %d, %Y %H:%M:%S",
];

const DATE_LAYOUTS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
];

/// Parse `text` in any recognised layout.
///
/// Pure digit strings are epoch offsets by length: 10 digits are seconds,
/// 13 milliseconds, 16 microseconds and 19 nanoseconds. Eight digits read
/// as `YYYYMMDD`.
pub fn parse_any(text: &str) -> Result<DateTime<Utc>, String> {
    let trimmed = text.trim();
    parse_trimmed(trimmed).ok_or_else(|| {
        format!(
            "error converting to a time / date value. error: 'unrecognized layout', value: '{text}'"
        )
    })
}

fn parse_trimmed(text: &str) -> Option<DateTime<Utc>> {
    if text.is_empty() {
        return None;
    }

    if text.bytes().all(|b| b.is_ascii_digit()) {
        return parse_epoch_digits(text);
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(text) {
        return Some(parsed.with_timezone(&Utc));
    }

    for layout in OFFSET_LAYOUTS {
        if let Ok(parsed) = DateTime::parse_from_str(text, layout) {
            return Some(parsed.with_timezone(&Utc));
        }
    }
    for layout in DATETIME_LAYOUTS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, layout) {
            return Some(parsed.and_utc());
        }
    }
    for layout in DATE_LAYOUTS {
        if let Ok(parsed) = NaiveDate::parse_from_str(text, layout) {
            return parsed.and_hms_opt(0, 0, 0).map(|midnight| midnight.and_utc());
        }
    }
    None
}

fn parse_epoch_digits(text: &str) -> Option<DateTime<Utc>> {
    if text.len() == 8 {
        let year = text[0..4].parse().ok()?;
        let month = text[4..6].parse().ok()?;
        let day = text[6..8].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|midnight| midnight.and_utc());
    }

    let raw: i64 = text.parse().ok()?;
    match text.len() {
        10 => DateTime::from_timestamp(raw, 0),
        13 => DateTime::from_timestamp_millis(raw),
        16 => DateTime::from_timestamp_micros(raw),
        19 => Some(DateTime::from_timestamp_nanos(raw)),
        _ => None,
    }
}
