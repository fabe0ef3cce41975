//! Solve endpoint.

use axum::extract::{Path, State};
use axum::Json;
use timetable_core::types::DbId;
use timetable_pipeline::SolveOutcome;

use crate::error::AppResult;
use crate::state::AppState;

/// POST /api/v1/schedules/{id}/solve
///
/// Runs the solver synchronously. A 200 carries the solver's verdict in
/// `status`; INFEASIBLE and FAILED results leave existing assignments in
/// place. Attempts that could not reach a verdict map to an error status
/// and are still recorded as solver runs.
pub async fn solve(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<SolveOutcome>> {
    let outcome = state.solver.run(id).await?;
    tracing::info!(
        schedule_id = id,
        run_id = outcome.run_id,
        status = ?outcome.status,
        total_assignments = outcome.total_assignments,
        "Solve request finished"
    );
    Ok(Json(outcome))
}
