//! Batch (student cohort) model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use timetable_core::error::CoreError;
use timetable_core::types::{DbId, Timestamp};

/// A row from the `batches` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Batch {
    pub id: DbId,
    pub name: String,
    pub student_count: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A batch with the sections it is enrolled in.
#[derive(Debug, Clone, Serialize)]
pub struct BatchWithSections {
    #[serde(flatten)]
    pub batch: Batch,
    pub section_ids: Vec<DbId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBatch {
    pub name: String,
    pub student_count: i32,
    #[serde(default)]
    pub section_ids: Vec<DbId>,
}

impl CreateBatch {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::Validation("Batch name is required".into()));
        }
        if self.student_count < 0 {
            return Err(CoreError::Validation("student_count must not be negative".into()));
        }
        Ok(())
    }
}

/// DTO for updating a batch. `section_ids`, when present, replaces the
/// enrollment list.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateBatch {
    pub name: Option<String>,
    pub student_count: Option<i32>,
    pub section_ids: Option<Vec<DbId>>,
}
