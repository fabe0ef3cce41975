//! Advisory feasibility checks run against a payload before solving.
//!
//! Sessions are expanded the way the solver expands them: each batch gets
//! `sessions_per_week` sessions per enrolled section, or per lab group for
//! lab sections that have groups. None of these checks block a solve.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::catalog::{CourseKind, RoomKind};
use crate::payload::{CoursePayload, SectionPayload, SolvePayload};
use crate::types::DbId;

/// One schedulable session as the solver sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub course_id: DbId,
    pub course_code: String,
    pub kind: CourseKind,
    pub section_id: DbId,
    pub lab_group_id: Option<DbId>,
    pub batch_id: DbId,
    /// Slots per session.
    pub duration: u32,
}

/// Result of the preflight pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PreflightReport {
    pub session_count: usize,
    pub session_slots: usize,
    pub reasons: Vec<String>,
}

impl PreflightReport {
    pub fn looks_feasible(&self) -> bool {
        self.reasons.is_empty()
    }
}

/// Slots per session: `hours_per_week / sessions_per_week`, at least 1.
fn session_duration(course: &CoursePayload) -> u32 {
    let per_session = if course.sessions_per_week > 0 {
        course.hours_per_week / course.sessions_per_week
    } else {
        course.hours_per_week
    };
    per_session.max(1) as u32
}

/// Expand every batch enrollment into individual sessions.
///
/// Enrollments naming a section absent from the payload are skipped.
pub fn expand_sessions(payload: &SolvePayload) -> Vec<Session> {
    let sections: HashMap<DbId, (&CoursePayload, &SectionPayload)> = payload
        .courses
        .iter()
        .flat_map(|c| c.sections.iter().map(move |s| (s.id, (c, s))))
        .collect();

    let mut sessions = Vec::new();
    for batch in &payload.batches {
        for section_id in &batch.section_ids {
            let Some((course, section)) = sections.get(section_id) else {
                continue;
            };
            let duration = session_duration(course);
            let count = course.sessions_per_week.max(0) as usize;
            let groups: Vec<Option<DbId>> =
                if course.kind == CourseKind::Lab && !section.lab_groups.is_empty() {
                    section.lab_groups.iter().map(|g| Some(g.id)).collect()
                } else {
                    vec![None]
                };
            for lab_group_id in groups {
                for _ in 0..count {
                    sessions.push(Session {
                        course_id: course.id,
                        course_code: course.code.clone(),
                        kind: course.kind,
                        section_id: section.id,
                        lab_group_id,
                        batch_id: batch.id,
                        duration,
                    });
                }
            }
        }
    }
    sessions
}

/// Collect reasons the payload cannot possibly be solved.
pub fn check_feasibility(payload: &SolvePayload) -> PreflightReport {
    let grid = payload.grid();
    let sessions = expand_sessions(payload);
    let mut reasons = Vec::new();

    let known_sections: HashSet<DbId> = payload
        .courses
        .iter()
        .flat_map(|c| c.sections.iter().map(|s| s.id))
        .collect();
    for batch in &payload.batches {
        for section_id in &batch.section_ids {
            if !known_sections.contains(section_id) {
                reasons.push(format!(
                    "Batch {} enrolls in unknown section {section_id}",
                    batch.name
                ));
            }
        }
    }

    let qualified: HashSet<DbId> = payload
        .faculty
        .iter()
        .flat_map(|f| f.qualified_course_ids.iter().copied())
        .collect();
    let room_kinds: HashSet<RoomKind> = payload.rooms.iter().map(|r| r.kind).collect();

    let mut reported = HashSet::new();
    for s in &sessions {
        if !reported.insert(s.course_id) {
            continue;
        }
        if !qualified.contains(&s.course_id) {
            reasons.push(format!("Course {} has no qualified faculty", s.course_code));
        }
        let needed = s.kind.required_room();
        if !room_kinds.contains(&needed) {
            reasons.push(format!(
                "Course {} needs a {needed} room but none exist",
                s.course_code
            ));
        }
        if s.duration as usize > grid.slots_per_day() {
            reasons.push(format!(
                "Course {} sessions last {} slots but a day has only {}",
                s.course_code,
                s.duration,
                grid.slots_per_day()
            ));
        }
    }

    let session_slots: usize = sessions.iter().map(|s| s.duration as usize).sum();
    let eligible_rooms: HashSet<DbId> = payload
        .rooms
        .iter()
        .filter(|r| sessions.iter().any(|s| s.kind.required_room() == r.kind))
        .map(|r| r.id)
        .collect();
    let room_slots = grid.instants() * eligible_rooms.len();
    if session_slots > room_slots {
        reasons.push(format!(
            "Total session-slots ({session_slots}) exceeds available room-slots ({room_slots})"
        ));
    }

    PreflightReport {
        session_count: sessions.len(),
        session_slots,
        reasons,
    }
}
