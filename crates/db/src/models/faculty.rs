//! Faculty model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use timetable_core::availability::Availability;
use timetable_core::catalog::FacultyKind;
use timetable_core::error::CoreError;
use timetable_core::types::{DbId, Timestamp};

/// A row from the `faculty` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Faculty {
    pub id: DbId,
    pub name: String,
    pub email: String,
    #[serde(rename = "type")]
    pub faculty_type: String,
    pub max_hours: i32,
    pub availability: Json<Availability>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Faculty {
    pub fn kind(&self) -> Result<FacultyKind, CoreError> {
        self.faculty_type.parse()
    }
}

/// A faculty member with the courses they are qualified to teach.
#[derive(Debug, Clone, Serialize)]
pub struct FacultyWithCourses {
    #[serde(flatten)]
    pub faculty: Faculty,
    pub course_ids: Vec<DbId>,
}

/// DTO for creating a faculty member.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFaculty {
    pub name: String,
    pub email: String,
    #[serde(rename = "type")]
    pub kind: FacultyKind,
    pub max_hours: i32,
    /// Defaults to every slot of the standard grid.
    pub availability: Option<Availability>,
    #[serde(default)]
    pub course_ids: Vec<DbId>,
}

impl CreateFaculty {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() || !self.email.contains('@') {
            return Err(CoreError::Validation(
                "Faculty needs a name and a valid email".into(),
            ));
        }
        if self.max_hours < 0 {
            return Err(CoreError::Validation("max_hours must not be negative".into()));
        }
        Ok(())
    }
}

/// DTO for updating a faculty member. `course_ids`, when present,
/// replaces the qualification list.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateFaculty {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<FacultyKind>,
    pub max_hours: Option<i32>,
    pub availability: Option<Availability>,
    pub course_ids: Option<Vec<DbId>>,
}
