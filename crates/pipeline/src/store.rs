//! Persistence seam for the orchestrator and its Postgres implementation.

use std::future::Future;
use std::time::Duration;

use sqlx::PgPool;
use timetable_core::payload::DomainSnapshot;
use timetable_core::solve_result::ProposedAssignment;
use timetable_core::types::{DbId, Timestamp};
use timetable_db::models::solver_run::FinishSolverRun;
use timetable_db::models::status::StatusId;
use timetable_db::repositories::{AssignmentRepo, ScheduleRepo, SnapshotRepo, SolverRunRepo};

use crate::error::SolveError;

/// Proof of holding a schedule's solve-in-progress token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveLock {
    pub schedule_id: DbId,
    pub token: Timestamp,
}

/// Storage operations a solve needs.
pub trait SolveStore: Send + Sync {
    /// Current status of the schedule, `None` if it does not exist.
    fn schedule_status(
        &self,
        schedule_id: DbId,
    ) -> impl Future<Output = Result<Option<StatusId>, SolveError>> + Send;

    /// Take the solve token atomically. `None` if another solve holds it.
    fn acquire_solve_lock(
        &self,
        schedule_id: DbId,
    ) -> impl Future<Output = Result<Option<SolveLock>, SolveError>> + Send;

    fn release_solve_lock(
        &self,
        lock: &SolveLock,
    ) -> impl Future<Output = Result<(), SolveError>> + Send;

    /// Append a Running solver run and return its id.
    fn start_run(&self, schedule_id: DbId) -> impl Future<Output = Result<DbId, SolveError>> + Send;

    /// `None` if the schedule does not exist.
    fn load_snapshot(
        &self,
        schedule_id: DbId,
    ) -> impl Future<Output = Result<Option<DomainSnapshot>, SolveError>> + Send;

    /// Replace all of the schedule's assignments and mark it Solved, all
    /// or nothing. Returns the number of rows written.
    fn replace_assignments(
        &self,
        schedule_id: DbId,
        assignments: &[ProposedAssignment],
    ) -> impl Future<Output = Result<u64, SolveError>> + Send;

    fn finish_run(
        &self,
        run_id: DbId,
        finish: &FinishSolverRun,
    ) -> impl Future<Output = Result<(), SolveError>> + Send;
}

/// [`SolveStore`] backed by the repositories.
#[derive(Clone)]
pub struct PgSolveStore {
    pool: PgPool,
    /// Age after which a held solve token counts as abandoned.
    stale_after: Duration,
}

impl PgSolveStore {
    pub fn new(pool: PgPool, stale_after: Duration) -> Self {
        Self { pool, stale_after }
    }
}

impl SolveStore for PgSolveStore {
    async fn schedule_status(&self, schedule_id: DbId) -> Result<Option<StatusId>, SolveError> {
        Ok(ScheduleRepo::find_by_id(&self.pool, schedule_id)
            .await?
            .map(|s| s.status_id))
    }

    async fn acquire_solve_lock(&self, schedule_id: DbId) -> Result<Option<SolveLock>, SolveError> {
        let token = ScheduleRepo::try_begin_solve(&self.pool, schedule_id, self.stale_after).await?;
        Ok(token.map(|token| SolveLock { schedule_id, token }))
    }

    async fn release_solve_lock(&self, lock: &SolveLock) -> Result<(), SolveError> {
        let released = ScheduleRepo::end_solve(&self.pool, lock.schedule_id, lock.token).await?;
        if !released {
            tracing::warn!(
                schedule_id = lock.schedule_id,
                "Solve token was taken over before release"
            );
        }
        Ok(())
    }

    async fn start_run(&self, schedule_id: DbId) -> Result<DbId, SolveError> {
        Ok(SolverRunRepo::create_running(&self.pool, schedule_id).await?.id)
    }

    async fn load_snapshot(&self, schedule_id: DbId) -> Result<Option<DomainSnapshot>, SolveError> {
        Ok(SnapshotRepo::load(&self.pool, schedule_id).await?)
    }

    async fn replace_assignments(
        &self,
        schedule_id: DbId,
        assignments: &[ProposedAssignment],
    ) -> Result<u64, SolveError> {
        Ok(AssignmentRepo::replace_for_schedule(&self.pool, schedule_id, assignments).await?)
    }

    async fn finish_run(&self, run_id: DbId, finish: &FinishSolverRun) -> Result<(), SolveError> {
        match SolverRunRepo::finish(&self.pool, run_id, finish).await? {
            Some(_) => Ok(()),
            None => Err(SolveError::Persistence(format!(
                "Solver run {run_id} is not running"
            ))),
        }
    }
}
