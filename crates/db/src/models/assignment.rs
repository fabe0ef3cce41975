//! Assignment model and listing filter.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use timetable_core::error::CoreError;
use timetable_core::grid::{GridAssignment, GridView};
use timetable_core::types::{DbId, Timestamp};

/// A row from the `assignments` table joined with the faculty, room and
/// batch names.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AssignmentWithNames {
    pub id: DbId,
    pub schedule_id: DbId,
    pub section_id: DbId,
    pub lab_group_id: Option<DbId>,
    pub faculty_id: DbId,
    pub room_id: DbId,
    pub batch_id: DbId,
    pub day: String,
    pub slot_index: i32,
    pub duration: i32,
    pub course_code: String,
    pub course_name: String,
    pub start_time: String,
    pub end_time: String,
    pub created_at: Timestamp,
    pub faculty_name: String,
    pub room_name: String,
    pub batch_name: String,
}

impl AssignmentWithNames {
    pub fn to_grid_assignment(&self) -> Result<GridAssignment, CoreError> {
        let non_negative = |field: &str, v: i32| {
            u32::try_from(v).map_err(|_| {
                CoreError::Internal(format!("assignment {}: negative {field} {v}", self.id))
            })
        };
        Ok(GridAssignment {
            id: self.id,
            day: self.day.parse()?,
            slot_index: non_negative("slot_index", self.slot_index)?,
            duration: non_negative("duration", self.duration)?,
            course_code: self.course_code.clone(),
            course_name: self.course_name.clone(),
            start_time: self.start_time.parse()?,
            end_time: self.end_time.parse()?,
            faculty_name: self.faculty_name.clone(),
            room_name: self.room_name.clone(),
            batch_name: self.batch_name.clone(),
        })
    }
}

/// Optional filters for listing a schedule's assignments.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssignmentFilter {
    pub batch_id: Option<DbId>,
    pub faculty_id: Option<DbId>,
    pub room_id: Option<DbId>,
}

impl AssignmentFilter {
    /// The grid view implied by the filter. The first set id wins.
    pub fn view(&self) -> GridView {
        if self.batch_id.is_some() {
            GridView::Batch
        } else if self.faculty_id.is_some() {
            GridView::Faculty
        } else if self.room_id.is_some() {
            GridView::Room
        } else {
            GridView::Schedule
        }
    }
}
