//! Solver run audit records.

use serde::Serialize;
use sqlx::FromRow;
use timetable_core::types::{DbId, Timestamp};

use crate::models::status::StatusId;

/// A row from the `solver_runs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SolverRun {
    pub id: DbId,
    pub schedule_id: DbId,
    pub status_id: StatusId,
    pub started_at: Timestamp,
    pub finished_at: Option<Timestamp>,
    pub solve_time_ms: Option<i64>,
    pub total_score: Option<f64>,
    pub assignment_count: Option<i32>,
    pub diagnostics: Option<serde_json::Value>,
}

/// Final values written when a run completes.
#[derive(Debug, Clone, PartialEq)]
pub struct FinishSolverRun {
    pub status_id: StatusId,
    pub solve_time_ms: Option<i64>,
    pub total_score: Option<f64>,
    pub assignment_count: Option<i32>,
    /// Solver diagnostics, or `{"error": ...}` when the attempt failed.
    pub diagnostics: Option<serde_json::Value>,
}
