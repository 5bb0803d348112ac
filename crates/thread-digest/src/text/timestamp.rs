//! Timestamp parsing and the `DD/MM/YYYY - HH:MM` display format
//!
//! Every formatted timestamp is rendered in UTC so that output does not
//! depend on the host's timezone.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use std::sync::OnceLock;

/// Display format used for every message and summary timestamp
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y - %H:%M";

/// Naive layouts accepted for `receivedDateTime` besides RFC 3339 / RFC 2822
const RECEIVED_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Layouts seen on quoted `Sent:` lines once the weekday has been stripped
const SENT_LAYOUTS: &[&str] = &[
    "%B %d, %Y %I:%M %p",
    "%B %d, %Y %I:%M:%S %p",
    "%B %d, %Y at %I:%M %p",
    "%B %d, %Y %H:%M",
    "%d %B %Y %I:%M %p",
    "%d %B %Y %H:%M",
    "%d %B, %Y %H:%M",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M",
    TIMESTAMP_FORMAT,
];

fn re_weekday_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\w+,\s*").unwrap())
}

/// Format an instant as `DD/MM/YYYY - HH:MM` (24-hour, UTC)
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a `DD/MM/YYYY - HH:MM` string back into an instant
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT).ok()
}

/// Parse a record's `receivedDateTime`
///
/// Accepts RFC 3339, RFC 2822, a handful of naive ISO layouts (read as UTC)
/// and bare dates (midnight UTC).
pub fn parse_received(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(naive) = parse_naive(text, RECEIVED_LAYOUTS) {
        return Some(naive.and_utc());
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|n| n.and_utc())
}

/// Parse the value of a quoted `Sent:` line, e.g. `Monday, October 6, 2025 9:14 AM`
pub fn parse_sent(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Some(dt) = parse_received(text) {
        return Some(dt);
    }

    let stripped = re_weekday_prefix().replace(text, "");
    let stripped = stripped.trim();
    if let Some(dt) = parse_received(stripped) {
        return Some(dt);
    }

    parse_naive(stripped, SENT_LAYOUTS).map(|n| n.and_utc())
}

fn parse_naive(text: &str, layouts: &[&str]) -> Option<NaiveDateTime> {
    layouts
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(text, layout).ok())
}

/// Convert `DD/MM/YYYY - H:MM AM|PM` to 24-hour form.
///
/// Anything without a recognizable meridiem is returned unchanged.
pub fn to_24_hour(timestamp: &str) -> String {
    let unchanged = || timestamp.to_string();

    let Some((date, time)) = timestamp.split_once(" - ") else {
        return unchanged();
    };
    let mut parts = time.split_whitespace();
    let (Some(clock), Some(period)) = (parts.next(), parts.next()) else {
        return unchanged();
    };
    let Some((hours, minutes)) = clock.split_once(':') else {
        return unchanged();
    };
    let Ok(mut hour) = hours.parse::<u32>() else {
        return unchanged();
    };

    match period.to_ascii_uppercase().as_str() {
        "PM" if hour != 12 => hour += 12,
        "AM" if hour == 12 => hour = 0,
        "AM" | "PM" => {}
        _ => return unchanged(),
    }

    format!("{date} - {hour:02}:{minutes:0>2}")
}
