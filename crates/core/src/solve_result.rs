//! Solver response document and the checks run before it is written.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::calendar::{ClockTime, Weekday};
use crate::payload::SolvePayload;
use crate::scheduling::run_status;
use crate::types::{DbId, SlotIndex};

/// Overall outcome reported by the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SolveStatus {
    Success,
    Infeasible,
    Failed,
    /// Any tag this layer does not know. Treated as a failure.
    #[serde(other)]
    Unknown,
}

impl SolveStatus {
    /// The solver run status a result with this tag is recorded as.
    pub fn run_status_id(self) -> i16 {
        match self {
            SolveStatus::Success => run_status::SUCCESS,
            SolveStatus::Infeasible => run_status::INFEASIBLE,
            SolveStatus::Failed | SolveStatus::Unknown => run_status::FAILED,
        }
    }
}

/// Score breakdown and human-readable reasons. Unknown keys are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    #[serde(default)]
    pub hard_score: f64,
    #[serde(default)]
    pub soft_score: f64,
    #[serde(default)]
    pub reasons: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One session placement proposed by the solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposedAssignment {
    pub section_id: DbId,
    pub lab_group_id: Option<DbId>,
    pub faculty_id: DbId,
    pub room_id: DbId,
    pub batch_id: DbId,
    pub day: Weekday,
    pub slot_index: SlotIndex,
    /// Number of consecutive slots covered.
    pub duration: u32,
    pub course_code: String,
    pub course_name: String,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
}

/// The solver's answer for one payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveResult {
    pub status: SolveStatus,
    pub solve_time_ms: i64,
    pub total_score: Option<f64>,
    #[serde(default)]
    pub assignments: Vec<ProposedAssignment>,
    pub diagnostics: Option<Diagnostics>,
}

impl SolveResult {
    /// True for a successful result that actually proposes placements.
    ///
    /// A SUCCESS with zero assignments is vacuous and must not replace
    /// the schedule's current assignments.
    pub fn has_placements(&self) -> bool {
        self.status == SolveStatus::Success && !self.assignments.is_empty()
    }
}

/// Check every proposed assignment against the payload it answers and
/// return them with display times re-derived from the payload's grid.
///
/// Every referenced id must exist in the payload (a lab group must belong
/// to the assignment's section), the day must be a teaching day, and the
/// whole `slot_index..slot_index + duration` range must lie inside the
/// grid. All problems are collected; on any problem nothing is returned.
pub fn prepare_assignments(
    result: &SolveResult,
    payload: &SolvePayload,
) -> Result<Vec<ProposedAssignment>, Vec<String>> {
    let grid = payload.grid();

    let mut sections: HashMap<DbId, HashSet<DbId>> = HashMap::new();
    for course in &payload.courses {
        for section in &course.sections {
            sections.insert(section.id, section.lab_groups.iter().map(|g| g.id).collect());
        }
    }
    let faculty: HashSet<DbId> = payload.faculty.iter().map(|f| f.id).collect();
    let rooms: HashSet<DbId> = payload.rooms.iter().map(|r| r.id).collect();
    let batches: HashSet<DbId> = payload.batches.iter().map(|b| b.id).collect();

    let mut problems = Vec::new();
    let mut prepared = Vec::with_capacity(result.assignments.len());

    for (i, a) in result.assignments.iter().enumerate() {
        match sections.get(&a.section_id) {
            None => problems.push(format!("assignment {i}: unknown section_id {}", a.section_id)),
            Some(groups) => {
                if let Some(lg) = a.lab_group_id {
                    if !groups.contains(&lg) {
                        problems.push(format!(
                            "assignment {i}: lab_group_id {lg} is not a group of section {}",
                            a.section_id
                        ));
                    }
                }
            }
        }
        if !faculty.contains(&a.faculty_id) {
            problems.push(format!("assignment {i}: unknown faculty_id {}", a.faculty_id));
        }
        if !rooms.contains(&a.room_id) {
            problems.push(format!("assignment {i}: unknown room_id {}", a.room_id));
        }
        if !batches.contains(&a.batch_id) {
            problems.push(format!("assignment {i}: unknown batch_id {}", a.batch_id));
        }
        if !grid.has_day(a.day) {
            problems.push(format!("assignment {i}: {} is not a teaching day", a.day));
        }

        match grid.span_times(a.slot_index, a.duration) {
            None => problems.push(format!(
                "assignment {i}: slots {}..{} do not fit the time grid",
                a.slot_index,
                a.slot_index.saturating_add(a.duration)
            )),
            Some((start_time, end_time)) => prepared.push(ProposedAssignment {
                start_time,
                end_time,
                ..a.clone()
            }),
        }
    }

    if problems.is_empty() {
        Ok(prepared)
    } else {
        Err(problems)
    }
}
