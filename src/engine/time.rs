use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use derive_more::{Display, Error};
use once_cell::sync::Lazy;
use regex::Regex;

/// Accepts `H:mm` and `HH:mm` wall-clock times in the 00:00..=23:59 range.
static TIME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-1]?[0-9]|2[0-3]):([0-5][0-9])$").expect("time pattern is valid")
});

pub const MINUTES_PER_DAY: u16 = 24 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum TimeError {
    #[display(fmt = "invalid time format '{}', expected HH:mm", value)]
    InvalidTimeFormat { value: String },
}

/// Wall-clock time of day, stored as minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(u16);

impl ClockTime {
    pub fn from_minutes(minutes: u16) -> Option<Self> {
        (minutes < MINUTES_PER_DAY).then_some(ClockTime(minutes))
    }

    pub fn minutes(self) -> i32 {
        i32::from(self.0)
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }

    pub fn to_naive_time(self) -> NaiveTime {
        // hour < 24 and minute < 60 by construction
        NaiveTime::from_hms_opt(u32::from(self.hour()), u32::from(self.minute()), 0)
            .unwrap_or(NaiveTime::MIN)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for ClockTime {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_time(s)
    }
}

/// Seconds are truncated; `TIME` columns come back as `HH:mm:ss`.
impl From<NaiveTime> for ClockTime {
    fn from(t: NaiveTime) -> Self {
        ClockTime((t.hour() * 60 + t.minute()) as u16)
    }
}

/// Parse an `HH:mm` string into minutes since midnight.
pub fn parse_time(s: &str) -> Result<ClockTime, TimeError> {
    let invalid = || TimeError::InvalidTimeFormat {
        value: s.to_string(),
    };

    let caps = TIME_PATTERN.captures(s).ok_or_else(invalid)?;
    let hours: u16 = caps[1].parse().map_err(|_| invalid())?;
    let minutes: u16 = caps[2].parse().map_err(|_| invalid())?;

    Ok(ClockTime(hours * 60 + minutes))
}

/// Zero-padded `HH:mm`.
pub fn format_time(time: ClockTime) -> String {
    time.to_string()
}

/// Parse an optional field, treating blank strings as absent.
pub(crate) fn parse_optional(s: Option<&str>) -> Result<Option<ClockTime>, TimeError> {
    match s.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => parse_time(v).map(Some),
    }
}
