//! Solver request document and the pure transform that produces it.
//!
//! The persistence layer loads a [`DomainSnapshot`] for one schedule;
//! [`build_payload`] turns it into the [`SolvePayload`] sent to the
//! external solver. Identifiers pass through untouched so results can be
//! written back against the same rows.

use serde::{Deserialize, Serialize};

use crate::availability::Availability;
use crate::catalog::{CourseKind, FacultyKind, RoomKind};
use crate::error::CoreError;
use crate::time_config::TimeConfig;
use crate::time_grid::SlotGrid;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// The complete solver input for one schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolvePayload {
    pub schedule_id: DbId,
    pub time_config: TimeConfig,
    pub courses: Vec<CoursePayload>,
    pub faculty: Vec<FacultyPayload>,
    pub rooms: Vec<RoomPayload>,
    pub batches: Vec<BatchPayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoursePayload {
    pub id: DbId,
    pub code: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CourseKind,
    pub hours_per_week: i32,
    pub sessions_per_week: i32,
    pub sections: Vec<SectionPayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionPayload {
    pub id: DbId,
    pub name: String,
    /// Always empty for lecture courses.
    pub lab_groups: Vec<LabGroupPayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabGroupPayload {
    pub id: DbId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacultyPayload {
    pub id: DbId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FacultyKind,
    pub max_hours: i32,
    pub availability: Availability,
    pub qualified_course_ids: Vec<DbId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomPayload {
    pub id: DbId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: RoomKind,
    pub capacity: i32,
    pub availability: Availability,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchPayload {
    pub id: DbId,
    pub name: String,
    pub student_count: i32,
    pub section_ids: Vec<DbId>,
}

impl SolvePayload {
    /// The slot grid every index in this payload refers to.
    pub fn grid(&self) -> SlotGrid {
        SlotGrid::derive(&self.time_config)
    }
}

// ---------------------------------------------------------------------------
// Snapshot -> payload
// ---------------------------------------------------------------------------

/// Everything the payload needs, as read from storage for one schedule.
///
/// Entity entries reuse the wire structs; availability is stored verbatim
/// and narrowed to the schedule's grid by [`build_payload`].
#[derive(Debug, Clone)]
pub struct DomainSnapshot {
    pub schedule_id: DbId,
    pub time_config: Option<TimeConfig>,
    pub courses: Vec<CoursePayload>,
    pub faculty: Vec<FacultyPayload>,
    pub rooms: Vec<RoomPayload>,
    pub batches: Vec<BatchPayload>,
}

/// Translate a domain snapshot into a solver payload.
///
/// Fails with `NotFound` when the schedule has no time configuration and
/// with `Configuration` when the configuration breaks a structural rule.
/// Availability entries that do not exist in the schedule's grid (another
/// schedule's wider day, say) are left out so every index sent is
/// derivable from this schedule's time configuration.
pub fn build_payload(snapshot: DomainSnapshot) -> Result<SolvePayload, CoreError> {
    let DomainSnapshot {
        schedule_id,
        time_config,
        courses,
        mut faculty,
        mut rooms,
        batches,
    } = snapshot;

    let time_config = time_config.ok_or(CoreError::NotFound {
        entity: "TimeConfig",
        id: schedule_id,
    })?;
    time_config.validate()?;

    let grid = SlotGrid::derive(&time_config);
    for f in &mut faculty {
        f.availability = f.availability.restricted_to(&grid);
    }
    for r in &mut rooms {
        r.availability = r.availability.restricted_to(&grid);
    }

    Ok(SolvePayload {
        schedule_id,
        time_config,
        courses,
        faculty,
        rooms,
        batches,
    })
}
