//! Time-of-day handling for schedule inputs and predicted arrivals.
//!
//! Schedule times arrive as human-entered "HH:MM" strings, sometimes carrying
//! an AM/PM marker, or as numeric minute counts. The model consumes minutes
//! since midnight as a float, and predicted arrivals are rendered back to
//! "HH:MM".

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};

/// Number of minutes in a day.
pub const MINUTES_PER_DAY: i64 = 24 * 60;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Parse a clock time into minutes since midnight.
///
/// Meridiem markers are removed, not interpreted, and so is all whitespace.
/// What remains must be `H:M` with digit fields (an optional `+` and
/// leading zeros are allowed), the hour in 0-23 and the minute in 0-59.
///
/// # Examples
///
/// ```
/// use delay_predictor::domain::parse_clock;
///
/// assert_eq!(parse_clock("08:15"), Ok(495));
/// assert_eq!(parse_clock(" 8:15 PM"), Ok(495));
/// assert_eq!(parse_clock("0:00"), Ok(0));
///
/// assert!(parse_clock("25:99").is_err());
/// assert_eq!(parse_clock("008:15"), Ok(495));
/// assert!(parse_clock("0815").is_err());
/// assert!(parse_clock("08:15:00").is_err());
/// ```
pub fn parse_clock(s: &str) -> Result<u32, TimeError> {
    let normalized: String = s
        .replace("PM", "")
        .replace("AM", "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    let mut fields = normalized.split(':');
    let (Some(hour), Some(minute), None) = (fields.next(), fields.next(), fields.next()) else {
        return Err(TimeError::new("expected exactly one ':' separator"));
    };

    let hour = parse_digits(hour).ok_or_else(|| TimeError::new("invalid hour digits"))?;
    if hour > 23 {
        return Err(TimeError::new("hour must be 0-23"));
    }

    let minute = parse_digits(minute).ok_or_else(|| TimeError::new("invalid minute digits"))?;
    if minute > 59 {
        return Err(TimeError::new("minute must be 0-59"));
    }

    Ok(hour * 60 + minute)
}

/// Parse a run of ASCII digits with an optional leading `+`.
///
/// Leading zeros are allowed, so "008" is 8.
fn parse_digits(s: &str) -> Option<u32> {
    let digits = s.strip_prefix('+').unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// A schedule time as supplied by a caller.
///
/// Deserializes from either a JSON string or a JSON number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeInput {
    /// Minutes since midnight, used as-is.
    Minutes(f64),
    /// Clock text such as "08:15" or "8:15 PM".
    Text(String),
}

impl TimeInput {
    /// Convert to minutes since midnight.
    ///
    /// Unparsable text yields NaN rather than an error, so a bad schedule
    /// time degrades the features derived from it instead of failing the
    /// whole prediction. Callers must check the final result for validity.
    pub fn to_minutes(&self) -> f64 {
        match self {
            TimeInput::Minutes(minutes) => *minutes,
            TimeInput::Text(text) => match parse_clock(text) {
                Ok(minutes) => f64::from(minutes),
                Err(e) => {
                    tracing::warn!(input = %text, error = %e, "schedule time degraded to NaN");
                    f64::NAN
                }
            },
        }
    }
}

impl From<&str> for TimeInput {
    fn from(s: &str) -> Self {
        TimeInput::Text(s.to_string())
    }
}

impl From<String> for TimeInput {
    fn from(s: String) -> Self {
        TimeInput::Text(s)
    }
}

impl From<f64> for TimeInput {
    fn from(minutes: f64) -> Self {
        TimeInput::Minutes(minutes)
    }
}

impl From<u32> for TimeInput {
    fn from(minutes: u32) -> Self {
        TimeInput::Minutes(f64::from(minutes))
    }
}

/// How hours past midnight are rendered for a predicted arrival.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ArrivalClock {
    /// Hours keep counting past 23: 1530 minutes renders as "25:30".
    #[default]
    Extended,
    /// Hours wrap modulo 24: 1530 minutes renders as "01:30".
    Wrapped,
}

impl ArrivalClock {
    /// Returns the configuration name of this convention.
    pub fn as_str(&self) -> &'static str {
        match self {
            ArrivalClock::Extended => "extended",
            ArrivalClock::Wrapped => "wrapped",
        }
    }
}

/// Error returned when parsing an unknown arrival clock convention.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown arrival clock {0:?}: expected \"extended\" or \"wrapped\"")]
pub struct InvalidArrivalClock(String);

impl FromStr for ArrivalClock {
    type Err = InvalidArrivalClock;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "extended" => Ok(ArrivalClock::Extended),
            "wrapped" => Ok(ArrivalClock::Wrapped),
            _ => Err(InvalidArrivalClock(s.to_string())),
        }
    }
}

impl fmt::Display for ArrivalClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A clock reading derived from a (possibly fractional) minute count.
///
/// Minutes are floored, so 501.75 reads as 08:21. Counts past a day or
/// below zero are kept; how they render depends on the [`ArrivalClock`].
///
/// # Examples
///
/// ```
/// use delay_predictor::domain::{ArrivalClock, ClockTime};
///
/// let t = ClockTime::from_minutes(1500.0).unwrap();
/// assert_eq!(t.to_string(), "25:00");
/// assert_eq!(t.render(ArrivalClock::Wrapped), "01:00");
///
/// assert!(ClockTime::from_minutes(f64::NAN).is_none());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClockTime {
    total_minutes: i64,
}

impl ClockTime {
    /// Create a clock time from a minute count. Returns `None` for NaN or
    /// infinite input.
    pub fn from_minutes(minutes: f64) -> Option<Self> {
        if !minutes.is_finite() {
            return None;
        }
        Some(Self {
            total_minutes: minutes.floor() as i64,
        })
    }

    /// Returns the whole minute count.
    pub fn total_minutes(&self) -> i64 {
        self.total_minutes
    }

    /// Returns the unwrapped hour, which may exceed 23 or be negative.
    pub fn hours(&self) -> i64 {
        self.total_minutes.div_euclid(60)
    }

    /// Returns the minute within the hour (0-59).
    pub fn minute(&self) -> i64 {
        self.total_minutes.rem_euclid(60)
    }

    /// Returns the time of day this reading falls on.
    pub fn to_naive_time(&self) -> NaiveTime {
        NaiveTime::default() + Duration::minutes(self.total_minutes.rem_euclid(MINUTES_PER_DAY))
    }

    /// Render as "HH:MM" under the given convention.
    pub fn render(&self, clock: ArrivalClock) -> String {
        match clock {
            ArrivalClock::Extended => self.to_string(),
            ArrivalClock::Wrapped => self.to_naive_time().format("%H:%M").to_string(),
        }
    }
}

impl fmt::Debug for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClockTime({self})")
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hours(), self.minute())
    }
}
