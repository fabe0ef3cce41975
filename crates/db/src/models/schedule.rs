//! Schedule and time configuration models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use timetable_core::calendar::{ClockTime, Weekday};
use timetable_core::error::CoreError;
use timetable_core::time_config::TimeConfig;
use timetable_core::types::{DbId, Timestamp};

use crate::models::solver_run::SolverRun;
use crate::models::status::StatusId;

/// A row from the `schedules` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Schedule {
    pub id: DbId,
    pub name: String,
    pub semester: String,
    pub status_id: StatusId,
    /// Set while a solve is in progress.
    pub solve_started_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `time_configs` table. Clock times are minutes since
/// midnight.
#[derive(Debug, Clone, FromRow)]
pub struct TimeConfigRow {
    pub schedule_id: DbId,
    pub days: Vec<String>,
    pub start_minute: i16,
    pub end_minute: i16,
    pub slot_duration: i16,
    pub break_start_minute: i16,
    pub break_end_minute: i16,
}

impl TimeConfigRow {
    /// Decode into the domain type. Does not run structural validation.
    pub fn to_time_config(&self) -> Result<TimeConfig, CoreError> {
        let days = self
            .days
            .iter()
            .map(|d| d.parse::<Weekday>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TimeConfig {
            days,
            start_time: clock(self.start_minute)?,
            end_time: clock(self.end_minute)?,
            slot_duration: u16::try_from(self.slot_duration).map_err(|_| {
                CoreError::Configuration(format!("Invalid slot duration {}", self.slot_duration))
            })?,
            break_start: clock(self.break_start_minute)?,
            break_end: clock(self.break_end_minute)?,
        })
    }
}

fn clock(minutes: i16) -> Result<ClockTime, CoreError> {
    let minutes = u16::try_from(minutes)
        .map_err(|_| CoreError::Configuration(format!("Invalid clock minute {minutes}")))?;
    ClockTime::from_minutes(minutes)
}

/// Column values for writing a [`TimeConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct TimeConfigColumns {
    pub days: Vec<String>,
    pub start_minute: i16,
    pub end_minute: i16,
    pub slot_duration: i16,
    pub break_start_minute: i16,
    pub break_end_minute: i16,
}

impl TryFrom<&TimeConfig> for TimeConfigColumns {
    type Error = CoreError;

    fn try_from(tc: &TimeConfig) -> Result<Self, Self::Error> {
        // Clock minutes are below 1440 and always fit.
        let minute = |t: ClockTime| t.minutes() as i16;
        Ok(Self {
            days: tc.days.iter().map(|d| d.as_str().to_string()).collect(),
            start_minute: minute(tc.start_time),
            end_minute: minute(tc.end_time),
            slot_duration: i16::try_from(tc.slot_duration).map_err(|_| {
                CoreError::Configuration(format!("Invalid slot duration {}", tc.slot_duration))
            })?,
            break_start_minute: minute(tc.break_start),
            break_end_minute: minute(tc.break_end),
        })
    }
}

/// Schedule detail returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleDetail {
    #[serde(flatten)]
    pub schedule: Schedule,
    pub status: &'static str,
    pub time_config: Option<TimeConfig>,
    pub assignment_count: i64,
    /// Most recent solver runs, newest first.
    pub recent_runs: Vec<SolverRun>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSchedule {
    pub name: String,
    pub semester: String,
    pub time_config: TimeConfig,
}

impl CreateSchedule {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() || self.semester.trim().is_empty() {
            return Err(CoreError::Validation(
                "Schedule name and semester are required".into(),
            ));
        }
        self.time_config.validate()
    }
}

/// DTO for updating a schedule. A present `time_config` is upserted in
/// the same transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSchedule {
    pub name: Option<String>,
    pub semester: Option<String>,
    pub status_id: Option<StatusId>,
    pub time_config: Option<TimeConfig>,
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn columns_round_trip_through_row() {
        let tc = TimeConfig::standard();
        let cols = TimeConfigColumns::try_from(&tc).unwrap();
        assert_eq!(cols.start_minute, 540);
        assert_eq!(cols.break_end_minute, 780);
        assert_eq!(cols.days, vec!["MON", "TUE", "WED", "THU", "FRI"]);

        let row = TimeConfigRow {
            schedule_id: 1,
            days: cols.days,
            start_minute: cols.start_minute,
            end_minute: cols.end_minute,
            slot_duration: cols.slot_duration,
            break_start_minute: cols.break_start_minute,
            break_end_minute: cols.break_end_minute,
        };
        assert_eq!(row.to_time_config().unwrap(), tc);
    }

    #[test]
    fn negative_minutes_fail_to_decode() {
        let row = TimeConfigRow {
            schedule_id: 1,
            days: vec!["MON".into()],
            start_minute: -5,
            end_minute: 600,
            slot_duration: 60,
            break_start_minute: 500,
            break_end_minute: 520,
        };
        assert_matches!(row.to_time_config(), Err(CoreError::Configuration(_)));
    }
}
