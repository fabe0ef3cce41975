//! One solve attempt from start to finish.
//!
//! Sequence for a schedule:
//! 1. refuse if the schedule is missing or not solvable
//! 2. take the solve token, or fail with `SolveInProgress`
//! 3. append a Running solver run
//! 4. snapshot the domain and build the payload
//! 5. call the solver
//! 6. for a SUCCESS with placements, check the result against the payload
//!    and replace the schedule's assignments atomically
//! 7. finish the run with the outcome, success or not
//! 8. release the token
//!
//! A failed attempt never touches assignments or the schedule status.

use serde::Serialize;
use timetable_core::error::CoreError;
use timetable_core::payload::build_payload;
use timetable_core::scheduling::{run_status, schedule_status};
use timetable_core::solve_result::{prepare_assignments, Diagnostics, SolveResult, SolveStatus};
use timetable_core::types::DbId;
use timetable_db::models::solver_run::FinishSolverRun;
use timetable_solver::SolverGateway;

use crate::error::SolveError;
use crate::store::SolveStore;

/// What the caller learns about a completed solver call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolveOutcome {
    pub run_id: DbId,
    pub status: SolveStatus,
    pub solve_time_ms: i64,
    pub total_score: Option<f64>,
    /// Rows written. Zero unless a SUCCESS with placements was applied.
    pub total_assignments: u64,
    pub diagnostics: Option<Diagnostics>,
}

/// A failed attempt, with the solver's answer when there was one.
struct AttemptError {
    error: SolveError,
    result: Option<SolveResult>,
}

impl From<SolveError> for AttemptError {
    fn from(error: SolveError) -> Self {
        Self {
            error,
            result: None,
        }
    }
}

/// Runs solves against a store and a solver.
pub struct SolveOrchestrator<S, G> {
    store: S,
    gateway: G,
}

impl<S: SolveStore, G: SolverGateway> SolveOrchestrator<S, G> {
    pub fn new(store: S, gateway: G) -> Self {
        Self { store, gateway }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Solve one schedule.
    ///
    /// `Ok` means the solver answered and its answer was recorded: check
    /// `status` to tell a result from an infeasible or failed search.
    /// `Err` means the attempt itself failed; unless the schedule was
    /// missing, not solvable or busy, the failure is recorded on a
    /// solver run.
    pub async fn run(&self, schedule_id: DbId) -> Result<SolveOutcome, SolveError> {
        let status = self
            .store
            .schedule_status(schedule_id)
            .await?
            .ok_or(SolveError::NotFound {
                entity: "Schedule",
                id: schedule_id,
            })?;
        if !schedule_status::is_solvable(status) {
            return Err(SolveError::Conflict(format!(
                "Schedule {schedule_id} is {} and cannot be solved",
                schedule_status::status_name(status)
            )));
        }

        let lock = self
            .store
            .acquire_solve_lock(schedule_id)
            .await?
            .ok_or(SolveError::SolveInProgress { schedule_id })?;

        let outcome = self.run_locked(schedule_id).await;

        if let Err(e) = self.store.release_solve_lock(&lock).await {
            tracing::error!(schedule_id, error = %e, "Failed to release solve token");
        }
        outcome
    }

    async fn run_locked(&self, schedule_id: DbId) -> Result<SolveOutcome, SolveError> {
        let run_id = self.store.start_run(schedule_id).await?;
        tracing::info!(schedule_id, run_id, "Solver run started");

        match self.attempt(schedule_id).await {
            Ok((result, applied)) => {
                let finish = FinishSolverRun {
                    status_id: result.status.run_status_id(),
                    solve_time_ms: Some(result.solve_time_ms),
                    total_score: result.total_score,
                    assignment_count: Some(clamp_count(applied)),
                    diagnostics: result
                        .diagnostics
                        .as_ref()
                        .and_then(|d| serde_json::to_value(d).ok()),
                };
                if let Err(e) = self.store.finish_run(run_id, &finish).await {
                    tracing::error!(schedule_id, run_id, error = %e, "Failed to finish solver run");
                }
                tracing::info!(
                    schedule_id,
                    run_id,
                    status = ?result.status,
                    assignments = applied,
                    solve_time_ms = result.solve_time_ms,
                    "Solver run finished"
                );
                Ok(SolveOutcome {
                    run_id,
                    status: result.status,
                    solve_time_ms: result.solve_time_ms,
                    total_score: result.total_score,
                    total_assignments: applied,
                    diagnostics: result.diagnostics,
                })
            }
            Err(AttemptError { error, result }) => {
                tracing::warn!(schedule_id, run_id, error = %error, "Solver run failed");
                let finish = failure_record(&error, result.as_ref());
                // Best effort: the attempt's error is what the caller sees.
                if let Err(e) = self.store.finish_run(run_id, &finish).await {
                    tracing::error!(schedule_id, run_id, error = %e, "Failed to record solver run failure");
                }
                Err(error)
            }
        }
    }

    /// Build, call and apply. Returns the solver's answer and the number
    /// of assignments written.
    async fn attempt(&self, schedule_id: DbId) -> Result<(SolveResult, u64), AttemptError> {
        let snapshot = self
            .store
            .load_snapshot(schedule_id)
            .await?
            .ok_or(SolveError::NotFound {
                entity: "Schedule",
                id: schedule_id,
            })?;
        let payload = build_payload(snapshot).map_err(|e| match e {
            CoreError::NotFound { .. } => SolveError::Configuration(format!(
                "Schedule {schedule_id} has no time configuration"
            )),
            other => SolveError::from(other),
        })?;

        let result = self
            .gateway
            .solve(&payload)
            .await
            .map_err(SolveError::from)?;

        if !result.has_placements() {
            if result.status == SolveStatus::Success {
                tracing::warn!(schedule_id, "Solver reported success without assignments");
            }
            return Ok((result, 0));
        }

        let prepared = match prepare_assignments(&result, &payload) {
            Ok(prepared) => prepared,
            Err(problems) => {
                return Err(AttemptError {
                    error: SolveError::Persistence(format!(
                        "Solver result rejected: {}",
                        problems.join("; ")
                    )),
                    result: Some(result),
                })
            }
        };

        match self.store.replace_assignments(schedule_id, &prepared).await {
            Ok(applied) => Ok((result, applied)),
            Err(error) => Err(AttemptError {
                error,
                result: Some(result),
            }),
        }
    }
}

/// The run record for a failed attempt: status Failed, the error text in
/// `diagnostics.error`, plus whatever the solver reported.
fn failure_record(error: &SolveError, result: Option<&SolveResult>) -> FinishSolverRun {
    let mut diagnostics = result
        .and_then(|r| r.diagnostics.as_ref())
        .and_then(|d| serde_json::to_value(d).ok())
        .and_then(|v| match v {
            serde_json::Value::Object(map) => Some(map),
            _ => None,
        })
        .unwrap_or_default();
    diagnostics.insert("error".into(), serde_json::Value::String(error.to_string()));

    FinishSolverRun {
        status_id: run_status::FAILED,
        solve_time_ms: result.map(|r| r.solve_time_ms),
        total_score: result.and_then(|r| r.total_score),
        assignment_count: Some(0),
        diagnostics: Some(serde_json::Value::Object(diagnostics)),
    }
}

fn clamp_count(count: u64) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}
