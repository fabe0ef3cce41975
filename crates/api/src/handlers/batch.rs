//! Handlers for the `/batches` resource.

use std::collections::HashSet;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use timetable_core::enrollment::{validate_enrollment, EnrolledSection};
use timetable_core::error::CoreError;
use timetable_core::types::DbId;
use timetable_db::models::batch::{BatchWithSections, CreateBatch, UpdateBatch};
use timetable_db::repositories::{BatchRepo, CourseRepo};
use timetable_db::DbPool;

use super::found_or_404;
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Check a requested enrollment: every section must exist, and the batch
/// may follow at most one section of each course.
async fn check_enrollment(pool: &DbPool, section_ids: &[DbId]) -> AppResult<()> {
    let rows = CourseRepo::sections_with_courses(pool, section_ids).await?;

    let known: HashSet<DbId> = rows.iter().map(|r| r.section_id).collect();
    if let Some(unknown) = section_ids.iter().find(|id| !known.contains(id)) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Section {unknown} does not exist"
        ))));
    }

    let enrolled: Vec<EnrolledSection> = rows.into_iter().map(EnrolledSection::from).collect();
    validate_enrollment(&enrolled)?;
    Ok(())
}

/// POST /api/v1/batches
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateBatch>,
) -> AppResult<(StatusCode, Json<BatchWithSections>)> {
    input.validate()?;
    check_enrollment(&state.pool, &input.section_ids).await?;
    let batch = BatchRepo::create(&state.pool, &input).await?;
    tracing::info!(
        batch_id = batch.batch.id,
        sections = batch.section_ids.len(),
        "Batch created"
    );
    Ok((StatusCode::CREATED, Json(batch)))
}

/// GET /api/v1/batches
pub async fn list(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<BatchWithSections>>>> {
    let batches = BatchRepo::list_with_sections(&state.pool).await?;
    Ok(Json(DataResponse { data: batches }))
}

/// GET /api/v1/batches/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<BatchWithSections>> {
    let batch = BatchRepo::find_with_sections(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Batch",
            id,
        }))?;
    Ok(Json(batch))
}

/// PUT /api/v1/batches/{id}
///
/// A present `section_ids` replaces the whole enrollment.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateBatch>,
) -> AppResult<Json<BatchWithSections>> {
    if input.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::Core(CoreError::Validation(
            "Batch name is required".into(),
        )));
    }
    if input.student_count.is_some_and(|c| c < 0) {
        return Err(AppError::Core(CoreError::Validation(
            "student_count must not be negative".into(),
        )));
    }
    if let Some(section_ids) = &input.section_ids {
        check_enrollment(&state.pool, section_ids).await?;
    }

    let batch = BatchRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Batch",
            id,
        }))?;
    Ok(Json(batch))
}

/// DELETE /api/v1/batches/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let deleted = BatchRepo::delete(&state.pool, id).await?;
    found_or_404(deleted, "Batch", id)?;
    Ok(StatusCode::NO_CONTENT)
}
