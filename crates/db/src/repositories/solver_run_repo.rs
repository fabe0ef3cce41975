//! Repository for the `solver_runs` table. Rows are never deleted here.

use sqlx::PgPool;
use timetable_core::scheduling::run_status;
use timetable_core::types::DbId;

use crate::models::solver_run::{FinishSolverRun, SolverRun};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, schedule_id, status_id, started_at, finished_at, solve_time_ms, \
    total_score, assignment_count, diagnostics";

/// Provides append and completion operations for the solve audit trail.
pub struct SolverRunRepo;

impl SolverRunRepo {
    /// Record the start of a solve attempt with status Running.
    pub async fn create_running(
        pool: &PgPool,
        schedule_id: DbId,
    ) -> Result<SolverRun, sqlx::Error> {
        let query = format!(
            "INSERT INTO solver_runs (schedule_id, status_id)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SolverRun>(&query)
            .bind(schedule_id)
            .bind(run_status::RUNNING)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<SolverRun>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM solver_runs WHERE id = $1");
        sqlx::query_as::<_, SolverRun>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Write the final outcome of a running attempt.
    ///
    /// Only a run still in Running is updated, so each run completes at
    /// most once. Returns `None` otherwise.
    pub async fn finish(
        pool: &PgPool,
        id: DbId,
        input: &FinishSolverRun,
    ) -> Result<Option<SolverRun>, sqlx::Error> {
        let query = format!(
            "UPDATE solver_runs SET
                status_id = $2,
                finished_at = NOW(),
                solve_time_ms = $3,
                total_score = $4,
                assignment_count = $5,
                diagnostics = $6
             WHERE id = $1 AND status_id = $7
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SolverRun>(&query)
            .bind(id)
            .bind(input.status_id)
            .bind(input.solve_time_ms)
            .bind(input.total_score)
            .bind(input.assignment_count)
            .bind(&input.diagnostics)
            .bind(run_status::RUNNING)
            .fetch_optional(pool)
            .await
    }

    /// Runs for a schedule, newest first. `limit` of `None` returns all.
    pub async fn list_for_schedule(
        pool: &PgPool,
        schedule_id: DbId,
        limit: Option<i64>,
    ) -> Result<Vec<SolverRun>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM solver_runs
             WHERE schedule_id = $1
             ORDER BY started_at DESC, id DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, SolverRun>(&query)
            .bind(schedule_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
