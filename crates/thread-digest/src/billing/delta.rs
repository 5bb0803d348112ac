//! Elapsed time between a billing contact and the first reply

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::text::parse_timestamp;

const MINUTES_PER_HOUR: i64 = 60;
const MINUTES_PER_DAY: i64 = 24 * MINUTES_PER_HOUR;

/// Whole minutes between two message timestamps, never negative.
///
/// Renders as `"D Days : H Hours : M Min"`, `"H Hours : M Min"` or `"M Min"`
/// depending on the most significant non-zero unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ElapsedDelta {
    minutes: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unrecognized time delta: {0:?}")]
pub struct ParseDeltaError(String);

impl ElapsedDelta {
    /// Gap between two `DD/MM/YYYY - HH:MM` timestamps.
    ///
    /// `None` when either side does not parse or `end` is before `start`.
    pub fn between(start: &str, end: &str) -> Option<Self> {
        let start = parse_timestamp(start)?;
        let end = parse_timestamp(end)?;
        Self::from_minutes((end - start).num_minutes())
    }

    /// `None` for negative durations
    pub fn from_minutes(minutes: i64) -> Option<Self> {
        (minutes >= 0).then_some(Self { minutes })
    }

    pub fn total_minutes(&self) -> i64 {
        self.minutes
    }

    /// Parse the display form back, e.g. `"1 Days : 2 Hours : 15 Min"`
    pub fn parse(text: &str) -> Option<Self> {
        let mut minutes = 0i64;
        let mut saw_unit = false;

        for part in text.split(':') {
            let mut words = part.split_whitespace();
            let (Some(value), Some(unit), None) = (words.next(), words.next(), words.next())
            else {
                return None;
            };
            let value: i64 = value.parse().ok()?;
            let scale = match unit.to_ascii_lowercase().as_str() {
                "days" | "day" => MINUTES_PER_DAY,
                "hours" | "hour" => MINUTES_PER_HOUR,
                "min" | "mins" | "minutes" => 1,
                _ => return None,
            };
            minutes = minutes.checked_add(value.checked_mul(scale)?)?;
            saw_unit = true;
        }

        if saw_unit {
            Self::from_minutes(minutes)
        } else {
            None
        }
    }
}

impl fmt::Display for ElapsedDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let days = self.minutes / MINUTES_PER_DAY;
        let hours = (self.minutes % MINUTES_PER_DAY) / MINUTES_PER_HOUR;
        let total_hours = self.minutes / MINUTES_PER_HOUR;
        let minutes = self.minutes % MINUTES_PER_HOUR;

        if days > 0 {
            write!(f, "{days} Days : {hours} Hours : {minutes} Min")
        } else if total_hours > 0 {
            write!(f, "{total_hours} Hours : {minutes} Min")
        } else {
            write!(f, "{minutes} Min")
        }
    }
}

impl FromStr for ElapsedDelta {
    type Err = ParseDeltaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ParseDeltaError(s.to_string()))
    }
}

impl From<ElapsedDelta> for String {
    fn from(delta: ElapsedDelta) -> Self {
        delta.to_string()
    }
}

impl TryFrom<String> for ElapsedDelta {
    type Error = ParseDeltaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minutes_only() {
        let delta = ElapsedDelta::between("01/10/2025 - 09:00", "01/10/2025 - 09:45").unwrap();
        assert_eq!(delta.to_string(), "45 Min");
        assert_eq!(delta.total_minutes(), 45);
    }

    #[test]
    fn test_days_hours_minutes() {
        let delta = ElapsedDelta::between("01/10/2025 - 09:00", "02/10/2025 - 11:15").unwrap();
        assert_eq!(delta.to_string(), "1 Days : 2 Hours : 15 Min");
    }

    #[test]
    fn test_hours_keep_zero_minutes() {
        let delta = ElapsedDelta::between("01/10/2025 - 09:00", "01/10/2025 - 12:00").unwrap();
        assert_eq!(delta.to_string(), "3 Hours : 0 Min");
    }

    #[test]
    fn test_zero_and_whole_days() {
        assert_eq!(ElapsedDelta::from_minutes(0).unwrap().to_string(), "0 Min");
        assert_eq!(
            ElapsedDelta::from_minutes(2 * MINUTES_PER_DAY).unwrap().to_string(),
            "2 Days : 0 Hours : 0 Min"
        );
    }

    #[test]
    fn test_negative_or_unparseable_is_absent() {
        assert!(ElapsedDelta::between("02/10/2025 - 09:00", "01/10/2025 - 09:00").is_none());
        assert!(ElapsedDelta::between("", "01/10/2025 - 09:00").is_none());
        assert!(ElapsedDelta::between("01/10/2025 - 09:00", "later").is_none());
        assert!(ElapsedDelta::from_minutes(-1).is_none());
    }

    #[test]
    fn test_parse_display_form() {
        for text in ["45 Min", "3 Hours : 0 Min", "1 Days : 2 Hours : 15 Min"] {
            let delta: ElapsedDelta = text.parse().unwrap();
            assert_eq!(delta.to_string(), text);
        }
        assert_eq!(ElapsedDelta::parse("1 Days : 2 Hours : 15 Min").unwrap().total_minutes(), 1575);
        assert!(ElapsedDelta::parse("").is_none());
        assert!(ElapsedDelta::parse("soon").is_none());
        assert!(ElapsedDelta::parse("5 Weeks").is_none());
    }

    #[test]
    fn test_serializes_as_display_string() {
        let delta = ElapsedDelta::from_minutes(45).unwrap();
        assert_eq!(serde_json::to_value(delta).unwrap(), "45 Min");
        let back: ElapsedDelta = serde_json::from_str("\"45 Min\"").unwrap();
        assert_eq!(back, delta);
    }
}
