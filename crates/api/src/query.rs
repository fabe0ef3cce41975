//! Shared query and body parameter types for API handlers.

use serde::Deserialize;
use timetable_core::calendar::Weekday;
use timetable_core::types::{DbId, SlotIndex};

/// Query parameters for `GET /schedules/{id}/solver-runs` (`?limit=`).
#[derive(Debug, Deserialize)]
pub struct RunListParams {
    pub limit: Option<i64>,
}

/// Body for the faculty and room availability toggles.
///
/// The slot is checked against the time grid of `schedule_id`.
#[derive(Debug, Deserialize)]
pub struct ToggleSlot {
    pub schedule_id: DbId,
    pub day: Weekday,
    pub slot_index: SlotIndex,
}
