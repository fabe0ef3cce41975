//! Batch enrollment rule: a batch follows at most one section per course.

use std::collections::{HashMap, HashSet};

use crate::error::CoreError;
use crate::types::DbId;

/// A section a batch asks to enroll in, with its owning course.
#[derive(Debug, Clone)]
pub struct EnrolledSection {
    pub section_id: DbId,
    pub course_id: DbId,
    pub course_code: String,
}

/// Reject repeated sections and more than one section of the same course.
pub fn validate_enrollment(sections: &[EnrolledSection]) -> Result<(), CoreError> {
    let mut seen_sections = HashSet::new();
    let mut by_course: HashMap<DbId, DbId> = HashMap::new();

    for s in sections {
        if !seen_sections.insert(s.section_id) {
            return Err(CoreError::Validation(format!(
                "Section {} is listed more than once",
                s.section_id
            )));
        }
        if let Some(existing) = by_course.insert(s.course_id, s.section_id) {
            return Err(CoreError::Validation(format!(
                "A batch may enroll in only one section of {} (got sections {existing} and {})",
                s.course_code, s.section_id
            )));
        }
    }
    Ok(())
}
