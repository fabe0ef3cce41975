//! Rendered timetable grid for a schedule.

use axum::extract::{Path, Query, State};
use axum::Json;
use timetable_core::error::CoreError;
use timetable_core::grid::{reconstruct, GridAssignment, TimetableGrid};
use timetable_core::types::DbId;
use timetable_db::models::assignment::AssignmentFilter;
use timetable_db::repositories::{AssignmentRepo, ScheduleRepo};

use super::schedule::find_schedule;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/v1/schedules/{id}/timetable?batch_id=|faculty_id=|room_id=
///
/// The filter picks both the assignments shown and the view: a batch
/// timetable omits batch names, a faculty timetable omits faculty names,
/// and so on.
pub async fn get_timetable(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(filter): Query<AssignmentFilter>,
) -> AppResult<Json<TimetableGrid>> {
    find_schedule(&state.pool, id).await?;
    let config = ScheduleRepo::find_time_config(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "TimeConfig",
            id,
        }))?;

    let rows = AssignmentRepo::list_for_schedule(&state.pool, id, &filter).await?;
    let assignments = rows
        .iter()
        .map(|row| row.to_grid_assignment())
        .collect::<Result<Vec<GridAssignment>, CoreError>>()?;

    let grid = reconstruct(&config, filter.view(), &assignments);
    if grid.has_conflicts() {
        tracing::warn!(
            schedule_id = id,
            conflicts = grid.conflicts.len(),
            "Timetable contains double-bookings"
        );
    }
    Ok(Json(grid))
}
