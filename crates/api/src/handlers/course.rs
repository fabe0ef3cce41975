//! Handlers for the `/courses` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use timetable_core::error::CoreError;
use timetable_core::types::DbId;
use timetable_db::models::course::{
    validate_hours, Course, CourseWithSections, CreateCourse, UpdateCourse,
};
use timetable_db::repositories::CourseRepo;

use super::found_or_404;
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/courses
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateCourse>,
) -> AppResult<(StatusCode, Json<CourseWithSections>)> {
    input.validate()?;
    let course = CourseRepo::create(&state.pool, &input).await?;
    tracing::info!(course_id = course.course.id, code = %course.course.code, "Course created");
    Ok((StatusCode::CREATED, Json(course)))
}

/// GET /api/v1/courses
pub async fn list(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<CourseWithSections>>>> {
    let courses = CourseRepo::list_with_sections(&state.pool).await?;
    Ok(Json(DataResponse { data: courses }))
}

/// GET /api/v1/courses/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<CourseWithSections>> {
    let course = CourseRepo::find_with_sections(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id,
        }))?;
    Ok(Json(course))
}

/// PUT /api/v1/courses/{id}
///
/// Hours and sessions are checked together, so changing one is validated
/// against the stored value of the other.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCourse>,
) -> AppResult<Json<Course>> {
    let current = CourseRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id,
        }))?;
    if [&input.code, &input.name]
        .iter()
        .any(|v| v.as_deref().is_some_and(|s| s.trim().is_empty()))
    {
        return Err(AppError::Core(CoreError::Validation(
            "Course code and name must not be empty".into(),
        )));
    }
    validate_hours(
        input.hours_per_week.unwrap_or(current.hours_per_week),
        input.sessions_per_week.unwrap_or(current.sessions_per_week),
    )?;

    let course = CourseRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id,
        }))?;
    Ok(Json(course))
}

/// DELETE /api/v1/courses/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let deleted = CourseRepo::delete(&state.pool, id).await?;
    found_or_404(deleted, "Course", id)?;
    Ok(StatusCode::NO_CONTENT)
}
