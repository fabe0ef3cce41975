//! Weekday codes and minute-of-day clock times.
//!
//! Both types serialize to the same text the solver boundary uses:
//! weekdays as `"MON"`..`"SAT"` and clock times as zero-padded `"HH:MM"`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Weekday
// ---------------------------------------------------------------------------

/// A teaching day. Declaration order is week order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
}

impl Weekday {
    /// All weekdays in week order.
    pub const ALL: [Weekday; 6] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
    ];

    /// The wire/storage code, e.g. `"MON"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Weekday::Mon => "MON",
            Weekday::Tue => "TUE",
            Weekday::Wed => "WED",
            Weekday::Thu => "THU",
            Weekday::Fri => "FRI",
            Weekday::Sat => "SAT",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weekday {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Weekday::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown weekday code '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// ClockTime
// ---------------------------------------------------------------------------

/// Minutes per day; the exclusive upper bound for a [`ClockTime`].
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// A time of day with minute precision, stored as minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClockTime(u16);

impl ClockTime {
    /// Build from minutes since midnight. Fails for values past 23:59.
    pub fn from_minutes(minutes: u16) -> Result<Self, CoreError> {
        if minutes >= MINUTES_PER_DAY {
            return Err(CoreError::Validation(format!(
                "Clock time must be before 24:00, got {minutes} minutes"
            )));
        }
        Ok(Self(minutes))
    }

    /// Build from hour and minute components.
    pub fn from_hm(hour: u16, minute: u16) -> Result<Self, CoreError> {
        if minute >= 60 {
            return Err(CoreError::Validation(format!(
                "Minute component must be below 60, got {minute}"
            )));
        }
        Self::from_minutes(hour * 60 + minute)
    }

    /// Build from a value the caller has already bounded below 24:00.
    pub(crate) fn from_minutes_unchecked(minutes: u16) -> Self {
        debug_assert!(minutes < MINUTES_PER_DAY);
        Self(minutes)
    }

    pub fn minutes(self) -> u16 {
        self.0
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl FromStr for ClockTime {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::Validation(format!("Expected HH:MM clock time, got '{s}'"));
        let (h, m) = s.split_once(':').ok_or_else(invalid)?;
        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return Err(invalid());
        }
        let hour: u16 = h.parse().map_err(|_| invalid())?;
        let minute: u16 = m.parse().map_err(|_| invalid())?;
        Self::from_hm(hour, minute)
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
