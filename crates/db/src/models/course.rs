//! Course, section and lab-group models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use timetable_core::catalog::CourseKind;
use timetable_core::enrollment::EnrolledSection;
use timetable_core::error::CoreError;
use timetable_core::types::{DbId, Timestamp};

/// A row from the `courses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Course {
    pub id: DbId,
    pub code: String,
    pub name: String,
    #[serde(rename = "type")]
    pub course_type: String,
    pub hours_per_week: i32,
    pub sessions_per_week: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Course {
    pub fn kind(&self) -> Result<CourseKind, CoreError> {
        self.course_type.parse()
    }
}

/// A row from the `sections` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Section {
    pub id: DbId,
    pub course_id: DbId,
    pub name: String,
    pub created_at: Timestamp,
}

/// A row from the `lab_groups` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LabGroup {
    pub id: DbId,
    pub section_id: DbId,
    pub name: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionWithGroups {
    #[serde(flatten)]
    pub section: Section,
    pub lab_groups: Vec<LabGroup>,
}

/// A course with its sections and their lab groups.
#[derive(Debug, Clone, Serialize)]
pub struct CourseWithSections {
    #[serde(flatten)]
    pub course: Course,
    pub sections: Vec<SectionWithGroups>,
}

/// A section joined with its owning course, used to check enrollments.
#[derive(Debug, Clone, FromRow)]
pub struct SectionCourse {
    pub section_id: DbId,
    pub course_id: DbId,
    pub course_code: String,
}

impl From<SectionCourse> for EnrolledSection {
    fn from(row: SectionCourse) -> Self {
        EnrolledSection {
            section_id: row.section_id,
            course_id: row.course_id,
            course_code: row.course_code,
        }
    }
}

/// DTO for creating a course together with its sections.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCourse {
    pub code: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CourseKind,
    pub hours_per_week: i32,
    pub sessions_per_week: i32,
    /// Section names, e.g. `["A", "B"]`.
    #[serde(default)]
    pub sections: Vec<String>,
    /// Lab groups created under every section, named `G1..Gn`. LAB only.
    pub lab_groups_per_section: Option<u32>,
}

impl CreateCourse {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.code.trim().is_empty() || self.name.trim().is_empty() {
            return Err(CoreError::Validation("Course code and name are required".into()));
        }
        validate_hours(self.hours_per_week, self.sessions_per_week)?;

        let mut names: Vec<&str> = self.sections.iter().map(|s| s.trim()).collect();
        if names.iter().any(|n| n.is_empty()) {
            return Err(CoreError::Validation("Section names must not be empty".into()));
        }
        names.sort_unstable();
        if names.windows(2).any(|w| w[0] == w[1]) {
            return Err(CoreError::Validation("Section names must be unique".into()));
        }

        if matches!(self.lab_groups_per_section, Some(n) if n > 0) && self.kind != CourseKind::Lab {
            return Err(CoreError::Validation(
                "Lab groups can only be created for LAB courses".into(),
            ));
        }
        Ok(())
    }
}

/// DTO for updating a course. Sections are managed at creation only.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCourse {
    pub code: Option<String>,
    pub name: Option<String>,
    pub hours_per_week: Option<i32>,
    pub sessions_per_week: Option<i32>,
}

/// Check hour/session counts. Either may be absent on update.
pub fn validate_hours(hours_per_week: i32, sessions_per_week: i32) -> Result<(), CoreError> {
    if hours_per_week <= 0 || sessions_per_week <= 0 {
        return Err(CoreError::Validation(
            "hours_per_week and sessions_per_week must be positive".into(),
        ));
    }
    if sessions_per_week > hours_per_week {
        return Err(CoreError::Validation(format!(
            "sessions_per_week ({sessions_per_week}) cannot exceed hours_per_week ({hours_per_week})"
        )));
    }
    Ok(())
}

/// Names for `count` lab groups: `G1`, `G2`, ...
pub fn lab_group_names(count: u32) -> Vec<String> {
    (1..=count).map(|n| format!("G{n}")).collect()
}
