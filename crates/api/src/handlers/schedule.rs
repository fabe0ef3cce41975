//! Handlers for the `/schedules` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use timetable_core::error::CoreError;
use timetable_core::payload::build_payload;
use timetable_core::preflight::{check_feasibility, PreflightReport};
use timetable_core::scheduling::schedule_status;
use timetable_core::types::DbId;
use timetable_db::models::assignment::{AssignmentFilter, AssignmentWithNames};
use timetable_db::models::schedule::{CreateSchedule, Schedule, ScheduleDetail, UpdateSchedule};
use timetable_db::models::solver_run::SolverRun;
use timetable_db::repositories::{AssignmentRepo, ScheduleRepo, SnapshotRepo, SolverRunRepo};
use timetable_db::DbPool;

use super::found_or_404;
use crate::error::{AppError, AppResult};
use crate::query::RunListParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Solver runs embedded in the schedule detail.
const RECENT_RUNS: i64 = 5;

/// Largest `limit` accepted by the solver-run listing.
const MAX_RUN_LIMIT: i64 = 100;

pub(crate) async fn find_schedule(pool: &DbPool, id: DbId) -> AppResult<Schedule> {
    ScheduleRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Schedule",
            id,
        }))
}

async fn detail(pool: &DbPool, schedule: Schedule) -> AppResult<ScheduleDetail> {
    let id = schedule.id;
    let time_config = ScheduleRepo::find_time_config(pool, id).await?;
    let assignment_count = AssignmentRepo::count_for_schedule(pool, id).await?;
    let recent_runs = SolverRunRepo::list_for_schedule(pool, id, Some(RECENT_RUNS)).await?;
    Ok(ScheduleDetail {
        status: schedule_status::status_name(schedule.status_id),
        schedule,
        time_config,
        assignment_count,
        recent_runs,
    })
}

/// POST /api/v1/schedules
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateSchedule>,
) -> AppResult<(StatusCode, Json<ScheduleDetail>)> {
    input.validate()?;
    let schedule = ScheduleRepo::create(&state.pool, &input).await?;
    tracing::info!(schedule_id = schedule.id, name = %schedule.name, "Schedule created");
    Ok((StatusCode::CREATED, Json(detail(&state.pool, schedule).await?)))
}

/// GET /api/v1/schedules
pub async fn list(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Schedule>>>> {
    let schedules = ScheduleRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: schedules }))
}

/// GET /api/v1/schedules/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ScheduleDetail>> {
    let schedule = find_schedule(&state.pool, id).await?;
    Ok(Json(detail(&state.pool, schedule).await?))
}

/// PUT /api/v1/schedules/{id}
///
/// A status change must be a legal manual transition; Solved is only
/// reached by solving. A new time configuration is validated before it
/// is stored.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSchedule>,
) -> AppResult<Json<ScheduleDetail>> {
    let current = find_schedule(&state.pool, id).await?;

    if [&input.name, &input.semester]
        .iter()
        .any(|v| v.as_deref().is_some_and(|s| s.trim().is_empty()))
    {
        return Err(AppError::Core(CoreError::Validation(
            "Schedule name and semester must not be empty".into(),
        )));
    }
    if let Some(time_config) = &input.time_config {
        time_config.validate()?;
    }
    if let Some(to) = input.status_id.filter(|to| *to != current.status_id) {
        if to == schedule_status::SOLVED {
            return Err(AppError::Core(CoreError::Validation(
                "A schedule becomes Solved only by running the solver".into(),
            )));
        }
        schedule_status::validate_transition(current.status_id, to)
            .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    }

    let schedule = ScheduleRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Schedule",
            id,
        }))?;
    Ok(Json(detail(&state.pool, schedule).await?))
}

/// DELETE /api/v1/schedules/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let deleted = ScheduleRepo::delete(&state.pool, id).await?;
    found_or_404(deleted, "Schedule", id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/schedules/{id}/assignments
pub async fn list_assignments(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(filter): Query<AssignmentFilter>,
) -> AppResult<Json<DataResponse<Vec<AssignmentWithNames>>>> {
    find_schedule(&state.pool, id).await?;
    let assignments = AssignmentRepo::list_for_schedule(&state.pool, id, &filter).await?;
    Ok(Json(DataResponse { data: assignments }))
}

/// GET /api/v1/schedules/{id}/solver-runs
pub async fn list_solver_runs(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<RunListParams>,
) -> AppResult<Json<DataResponse<Vec<SolverRun>>>> {
    if params.limit.is_some_and(|l| !(1..=MAX_RUN_LIMIT).contains(&l)) {
        return Err(AppError::BadRequest(format!(
            "limit must be between 1 and {MAX_RUN_LIMIT}"
        )));
    }
    find_schedule(&state.pool, id).await?;
    let runs = SolverRunRepo::list_for_schedule(&state.pool, id, params.limit).await?;
    Ok(Json(DataResponse { data: runs }))
}

/// GET /api/v1/schedules/{id}/preflight
///
/// Advisory only; a report with reasons does not prevent solving.
pub async fn preflight(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<PreflightReport>> {
    let snapshot = SnapshotRepo::load(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Schedule",
            id,
        }))?;
    let payload = build_payload(snapshot)?;
    Ok(Json(check_feasibility(&payload)))
}
