//! In-memory store and scripted solver for orchestrator tests.

#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use timetable_core::availability::Availability;
use timetable_core::calendar::Weekday;
use timetable_core::catalog::{CourseKind, FacultyKind, RoomKind};
use timetable_core::payload::{
    BatchPayload, CoursePayload, DomainSnapshot, FacultyPayload, LabGroupPayload, RoomPayload,
    SectionPayload,
};
use timetable_core::scheduling::schedule_status;
use timetable_core::solve_result::{Diagnostics, ProposedAssignment, SolveResult, SolveStatus};
use timetable_core::time_config::TimeConfig;
use timetable_core::types::DbId;
use timetable_db::models::solver_run::FinishSolverRun;
use timetable_db::models::status::StatusId;
use timetable_pipeline::{SolveError, SolveLock, SolveStore};
use timetable_solver::{SolverError, SolverGateway};

pub const SCHEDULE_ID: DbId = 1;

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: DbId,
    pub schedule_id: DbId,
    pub finish: Option<FinishSolverRun>,
}

#[derive(Debug)]
pub struct StoreState {
    pub status: Option<StatusId>,
    pub lock: Option<SolveLock>,
    pub snapshot: Option<DomainSnapshot>,
    pub assignments: Vec<ProposedAssignment>,
    pub runs: Vec<RunRecord>,
    /// Simulates a database failure inside the replace transaction.
    pub fail_replace: bool,
    pub replace_calls: usize,
}

/// A [`SolveStore`] over a single schedule held in memory.
///
/// `replace_assignments` checks references the way foreign keys would and
/// writes nothing on failure.
pub struct MemoryStore {
    pub state: Mutex<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState {
                status: Some(schedule_status::DRAFT),
                lock: None,
                snapshot: Some(snapshot()),
                assignments: Vec::new(),
                runs: Vec::new(),
                fail_replace: false,
                replace_calls: 0,
            }),
        }
    }

    pub fn with<F: FnOnce(&mut StoreState)>(self, f: F) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    pub fn snapshot_state<T>(&self, f: impl FnOnce(&StoreState) -> T) -> T {
        f(&self.state.lock().unwrap())
    }

    pub fn runs(&self) -> Vec<RunRecord> {
        self.snapshot_state(|s| s.runs.clone())
    }

    pub fn assignments(&self) -> Vec<ProposedAssignment> {
        self.snapshot_state(|s| s.assignments.clone())
    }

    pub fn status(&self) -> Option<StatusId> {
        self.snapshot_state(|s| s.status)
    }
}

impl SolveStore for MemoryStore {
    async fn schedule_status(&self, schedule_id: DbId) -> Result<Option<StatusId>, SolveError> {
        let state = self.state.lock().unwrap();
        Ok(if schedule_id == SCHEDULE_ID { state.status } else { None })
    }

    async fn acquire_solve_lock(&self, schedule_id: DbId) -> Result<Option<SolveLock>, SolveError> {
        let mut state = self.state.lock().unwrap();
        if state.lock.is_some() {
            return Ok(None);
        }
        let lock = SolveLock {
            schedule_id,
            token: Utc::now(),
        };
        state.lock = Some(lock.clone());
        Ok(Some(lock))
    }

    async fn release_solve_lock(&self, lock: &SolveLock) -> Result<(), SolveError> {
        let mut state = self.state.lock().unwrap();
        if state.lock.as_ref() == Some(lock) {
            state.lock = None;
        }
        Ok(())
    }

    async fn start_run(&self, schedule_id: DbId) -> Result<DbId, SolveError> {
        let mut state = self.state.lock().unwrap();
        let id = state.runs.len() as DbId + 1;
        state.runs.push(RunRecord {
            id,
            schedule_id,
            finish: None,
        });
        Ok(id)
    }

    async fn load_snapshot(&self, schedule_id: DbId) -> Result<Option<DomainSnapshot>, SolveError> {
        let state = self.state.lock().unwrap();
        if schedule_id != SCHEDULE_ID || state.status.is_none() {
            return Ok(None);
        }
        Ok(state.snapshot.clone())
    }

    async fn replace_assignments(
        &self,
        _schedule_id: DbId,
        assignments: &[ProposedAssignment],
    ) -> Result<u64, SolveError> {
        let mut state = self.state.lock().unwrap();
        state.replace_calls += 1;
        if state.fail_replace {
            return Err(SolveError::Persistence("connection reset".into()));
        }
        let known_faculty: HashSet<DbId> = state
            .snapshot
            .iter()
            .flat_map(|s| s.faculty.iter().map(|f| f.id))
            .collect();
        if let Some(bad) = assignments.iter().find(|a| !known_faculty.contains(&a.faculty_id)) {
            return Err(SolveError::Persistence(format!(
                "foreign key violation: faculty_id {}",
                bad.faculty_id
            )));
        }
        state.assignments = assignments.to_vec();
        state.status = Some(schedule_status::SOLVED);
        Ok(assignments.len() as u64)
    }

    async fn finish_run(&self, run_id: DbId, finish: &FinishSolverRun) -> Result<(), SolveError> {
        let mut state = self.state.lock().unwrap();
        let run = state
            .runs
            .iter_mut()
            .find(|r| r.id == run_id && r.finish.is_none())
            .ok_or_else(|| SolveError::Persistence(format!("run {run_id} is not running")))?;
        run.finish = Some(finish.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

/// Returns scripted responses in order and counts calls.
pub struct FakeGateway {
    responses: Mutex<VecDeque<Result<SolveResult, SolverError>>>,
    delay: Option<Duration>,
    pub calls: AtomicUsize,
}

impl FakeGateway {
    pub fn new(responses: Vec<Result<SolveResult, SolverError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn replying(result: SolveResult) -> Self {
        Self::new(vec![Ok(result)])
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SolverGateway for FakeGateway {
    async fn solve(
        &self,
        payload: &timetable_core::payload::SolvePayload,
    ) -> Result<SolveResult, SolverError> {
        assert_eq!(payload.schedule_id, SCHEDULE_ID);
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.responses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(SolverError::InvalidResponse("no scripted response".into())))
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Lecture CS101 (section 100), lab CS101L (section 110, groups 1100 and
/// 1101), faculty 20, rooms 30 (lecture) and 31 (lab), batch 40.
pub fn snapshot() -> DomainSnapshot {
    DomainSnapshot {
        schedule_id: SCHEDULE_ID,
        time_config: Some(TimeConfig::standard()),
        courses: vec![
            CoursePayload {
                id: 10,
                code: "CS101".into(),
                name: "Programming".into(),
                kind: CourseKind::Lecture,
                hours_per_week: 3,
                sessions_per_week: 3,
                sections: vec![SectionPayload {
                    id: 100,
                    name: "A".into(),
                    lab_groups: vec![],
                }],
            },
            CoursePayload {
                id: 11,
                code: "CS101L".into(),
                name: "Programming Lab".into(),
                kind: CourseKind::Lab,
                hours_per_week: 2,
                sessions_per_week: 1,
                sections: vec![SectionPayload {
                    id: 110,
                    name: "A".into(),
                    lab_groups: vec![
                        LabGroupPayload { id: 1100, name: "G1".into() },
                        LabGroupPayload { id: 1101, name: "G2".into() },
                    ],
                }],
            },
        ],
        faculty: vec![FacultyPayload {
            id: 20,
            name: "Ada".into(),
            kind: FacultyKind::Fulltime,
            max_hours: 18,
            availability: Availability::standard(),
            qualified_course_ids: vec![10, 11],
        }],
        rooms: vec![
            RoomPayload {
                id: 30,
                name: "R101".into(),
                kind: RoomKind::Lecture,
                capacity: 60,
                availability: Availability::standard(),
            },
            RoomPayload {
                id: 31,
                name: "LAB1".into(),
                kind: RoomKind::Lab,
                capacity: 30,
                availability: Availability::standard(),
            },
        ],
        batches: vec![BatchPayload {
            id: 40,
            name: "CSE-1".into(),
            student_count: 55,
            section_ids: vec![100, 110],
        }],
    }
}

pub fn lecture_at(day: Weekday, slot_index: u32) -> ProposedAssignment {
    ProposedAssignment {
        section_id: 100,
        lab_group_id: None,
        faculty_id: 20,
        room_id: 30,
        batch_id: 40,
        day,
        slot_index,
        duration: 1,
        course_code: "CS101".into(),
        course_name: "Programming".into(),
        start_time: "00:00".parse().unwrap(),
        end_time: "00:00".parse().unwrap(),
    }
}

pub fn lab_at(day: Weekday, slot_index: u32, lab_group_id: DbId) -> ProposedAssignment {
    ProposedAssignment {
        section_id: 110,
        lab_group_id: Some(lab_group_id),
        room_id: 31,
        duration: 2,
        course_code: "CS101L".into(),
        course_name: "Programming Lab".into(),
        ..lecture_at(day, slot_index)
    }
}

pub fn success(assignments: Vec<ProposedAssignment>) -> SolveResult {
    SolveResult {
        status: SolveStatus::Success,
        solve_time_ms: 420,
        total_score: Some(-2.0),
        assignments,
        diagnostics: Some(Diagnostics {
            hard_score: 0.0,
            soft_score: -2.0,
            reasons: vec![],
            extra: Default::default(),
        }),
    }
}

pub fn infeasible() -> SolveResult {
    SolveResult {
        status: SolveStatus::Infeasible,
        solve_time_ms: 900,
        total_score: None,
        assignments: vec![],
        diagnostics: Some(Diagnostics {
            hard_score: -3.0,
            soft_score: 0.0,
            reasons: vec!["CS101L needs a LAB room on MON".into()],
            extra: Default::default(),
        }),
    }
}
