//! A schedule's time configuration: teaching days, working hours, slot
//! length and the break window.
//!
//! The struct doubles as the solver wire form (`time_config` object), so
//! field names here are part of the external contract.

use serde::{Deserialize, Serialize};

use crate::calendar::{ClockTime, Weekday};
use crate::error::CoreError;

/// Parameters defining a schedule's slot grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeConfig {
    /// Teaching days in week order.
    pub days: Vec<Weekday>,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    /// Slot length in minutes.
    pub slot_duration: u16,
    pub break_start: ClockTime,
    pub break_end: ClockTime,
}

impl TimeConfig {
    /// The grid used when an entity is created without explicit
    /// availability: MON–FRI, 09:00–17:00, 60-minute slots, lunch 12:00–13:00.
    pub fn standard() -> Self {
        Self {
            days: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ],
            start_time: clock(9 * 60),
            end_time: clock(17 * 60),
            slot_duration: 60,
            break_start: clock(12 * 60),
            break_end: clock(13 * 60),
        }
    }

    /// Check every structural rule of a time configuration.
    ///
    /// - at least one day, no duplicates, days listed in week order
    /// - `start < break_start < break_end < end`
    /// - `slot_duration > 0` and divides both the pre-break and the
    ///   post-break span exactly
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.days.is_empty() {
            return Err(CoreError::Configuration(
                "Time configuration must include at least one day".into(),
            ));
        }
        if !self.days.windows(2).all(|w| w[0] < w[1]) {
            return Err(CoreError::Configuration(
                "Days must be unique and listed in week order".into(),
            ));
        }

        if !(self.start_time < self.break_start
            && self.break_start < self.break_end
            && self.break_end < self.end_time)
        {
            return Err(CoreError::Configuration(format!(
                "Expected start < break start < break end < end, got {}, {}-{}, {}",
                self.start_time, self.break_start, self.break_end, self.end_time
            )));
        }

        if self.slot_duration == 0 {
            return Err(CoreError::Configuration(
                "Slot duration must be positive".into(),
            ));
        }

        let before_break = self.break_start.minutes() - self.start_time.minutes();
        let after_break = self.end_time.minutes() - self.break_end.minutes();
        for (label, span) in [("pre-break", before_break), ("post-break", after_break)] {
            if span % self.slot_duration != 0 {
                return Err(CoreError::Configuration(format!(
                    "Slot duration of {} minutes does not divide the {label} span of {span} minutes",
                    self.slot_duration
                )));
            }
        }

        Ok(())
    }
}

fn clock(minutes: u16) -> ClockTime {
    ClockTime::from_minutes_unchecked(minutes)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn config(start: &str, end: &str, dur: u16, bs: &str, be: &str) -> TimeConfig {
        TimeConfig {
            days: vec![Weekday::Mon, Weekday::Tue],
            start_time: start.parse().unwrap(),
            end_time: end.parse().unwrap(),
            slot_duration: dur,
            break_start: bs.parse().unwrap(),
            break_end: be.parse().unwrap(),
        }
    }

    #[test]
    fn standard_config_is_valid() {
        assert!(TimeConfig::standard().validate().is_ok());
    }

    #[test]
    fn accepts_half_hour_slots() {
        assert!(config("08:30", "16:00", 30, "12:00", "12:30").validate().is_ok());
    }

    #[test]
    fn rejects_break_outside_working_hours() {
        let err = config("09:00", "17:00", 60, "08:00", "09:30").validate();
        assert_matches!(err, Err(CoreError::Configuration(_)));
    }

    #[test]
    fn rejects_inverted_break() {
        let err = config("09:00", "17:00", 60, "13:00", "12:00").validate();
        assert_matches!(err, Err(CoreError::Configuration(_)));
    }

    #[test]
    fn rejects_duration_not_dividing_pre_break_span() {
        let err = config("09:00", "17:00", 50, "12:00", "13:00").validate();
        assert_matches!(err, Err(CoreError::Configuration(msg)) if msg.contains("pre-break"));
    }

    #[test]
    fn rejects_duration_not_dividing_post_break_span() {
        let err = config("09:00", "17:30", 60, "12:00", "13:00").validate();
        assert_matches!(err, Err(CoreError::Configuration(msg)) if msg.contains("post-break"));
    }

    #[test]
    fn rejects_zero_duration() {
        let err = config("09:00", "17:00", 0, "12:00", "13:00").validate();
        assert_matches!(err, Err(CoreError::Configuration(_)));
    }

    #[test]
    fn rejects_empty_and_unordered_days() {
        let mut tc = TimeConfig::standard();
        tc.days.clear();
        assert!(tc.validate().is_err());

        tc.days = vec![Weekday::Wed, Weekday::Mon];
        assert!(tc.validate().is_err());

        tc.days = vec![Weekday::Mon, Weekday::Mon];
        assert!(tc.validate().is_err());
    }

    #[test]
    fn wire_form_uses_snake_case_and_hh_mm() {
        let json = serde_json::to_value(TimeConfig::standard()).unwrap();
        assert_eq!(json["days"][0], "MON");
        assert_eq!(json["start_time"], "09:00");
        assert_eq!(json["break_end"], "13:00");
        assert_eq!(json["slot_duration"], 60);
    }
}
