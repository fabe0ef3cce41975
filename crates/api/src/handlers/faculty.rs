//! Handlers for the `/faculty` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use timetable_core::error::CoreError;
use timetable_core::types::DbId;
use timetable_db::models::faculty::{CreateFaculty, Faculty, FacultyWithCourses, UpdateFaculty};
use timetable_db::repositories::FacultyRepo;

use super::{found_or_404, schedule_grid};
use crate::error::{AppError, AppResult};
use crate::query::ToggleSlot;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/faculty
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateFaculty>,
) -> AppResult<(StatusCode, Json<FacultyWithCourses>)> {
    input.validate()?;
    let faculty = FacultyRepo::create(&state.pool, &input).await?;
    tracing::info!(faculty_id = faculty.faculty.id, "Faculty created");
    Ok((StatusCode::CREATED, Json(faculty)))
}

/// GET /api/v1/faculty
pub async fn list(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<FacultyWithCourses>>>> {
    let faculty = FacultyRepo::list_with_courses(&state.pool).await?;
    Ok(Json(DataResponse { data: faculty }))
}

/// GET /api/v1/faculty/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<FacultyWithCourses>> {
    let faculty = FacultyRepo::find_with_courses(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Faculty",
            id,
        }))?;
    Ok(Json(faculty))
}

/// PUT /api/v1/faculty/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateFaculty>,
) -> AppResult<Json<FacultyWithCourses>> {
    if input.name.as_deref().is_some_and(|n| n.trim().is_empty())
        || input.email.as_deref().is_some_and(|e| !e.contains('@'))
    {
        return Err(AppError::Core(CoreError::Validation(
            "Faculty needs a name and a valid email".into(),
        )));
    }
    if input.max_hours.is_some_and(|h| h < 0) {
        return Err(AppError::Core(CoreError::Validation(
            "max_hours must not be negative".into(),
        )));
    }

    let faculty = FacultyRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Faculty",
            id,
        }))?;
    Ok(Json(faculty))
}

/// DELETE /api/v1/faculty/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let deleted = FacultyRepo::delete(&state.pool, id).await?;
    found_or_404(deleted, "Faculty", id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/faculty/{id}/availability/toggle
///
/// Flips one slot of the faculty member's availability. The slot must be
/// part of the given schedule's time grid.
pub async fn toggle_availability(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ToggleSlot>,
) -> AppResult<Json<Faculty>> {
    let grid = schedule_grid(&state.pool, input.schedule_id).await?;
    let faculty = FacultyRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Faculty",
            id,
        }))?;

    let mut availability = faculty.availability.0;
    let available = availability.toggle(&grid, input.day, input.slot_index)?;

    let faculty = FacultyRepo::set_availability(&state.pool, id, &availability)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Faculty",
            id,
        }))?;
    tracing::debug!(
        faculty_id = id,
        day = %input.day,
        slot_index = input.slot_index,
        available,
        "Faculty availability toggled"
    );
    Ok(Json(faculty))
}
