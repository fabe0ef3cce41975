//! Handlers for the `/rooms` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use timetable_core::error::CoreError;
use timetable_core::types::DbId;
use timetable_db::models::room::{CreateRoom, Room, UpdateRoom};
use timetable_db::repositories::RoomRepo;

use super::{found_or_404, schedule_grid};
use crate::error::{AppError, AppResult};
use crate::query::ToggleSlot;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/rooms
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateRoom>,
) -> AppResult<(StatusCode, Json<Room>)> {
    input.validate()?;
    let room = RoomRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(room)))
}

/// GET /api/v1/rooms
pub async fn list(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Room>>>> {
    let rooms = RoomRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: rooms }))
}

/// GET /api/v1/rooms/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Room>> {
    let room = RoomRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Room", id }))?;
    Ok(Json(room))
}

/// PUT /api/v1/rooms/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateRoom>,
) -> AppResult<Json<Room>> {
    if input.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::Core(CoreError::Validation(
            "Room name is required".into(),
        )));
    }
    if input.capacity.is_some_and(|c| c <= 0) {
        return Err(AppError::Core(CoreError::Validation(
            "capacity must be positive".into(),
        )));
    }

    let room = RoomRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Room", id }))?;
    Ok(Json(room))
}

/// DELETE /api/v1/rooms/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let deleted = RoomRepo::delete(&state.pool, id).await?;
    found_or_404(deleted, "Room", id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/rooms/{id}/availability/toggle
pub async fn toggle_availability(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ToggleSlot>,
) -> AppResult<Json<Room>> {
    let grid = schedule_grid(&state.pool, input.schedule_id).await?;
    let room = RoomRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Room", id }))?;

    let mut availability = room.availability.0;
    availability.toggle(&grid, input.day, input.slot_index)?;

    let room = RoomRepo::set_availability(&state.pool, id, &availability)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Room", id }))?;
    Ok(Json(room))
}
