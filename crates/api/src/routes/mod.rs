pub mod batch;
pub mod course;
pub mod faculty;
pub mod health;
pub mod room;
pub mod schedule;

use axum::Router;

use crate::state::AppState;

/// All resource routes, mounted under `/api/v1` by the binary.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/courses", course::router())
        .nest("/faculty", faculty::router())
        .nest("/rooms", room::router())
        .nest("/batches", batch::router())
        .nest("/schedules", schedule::router())
}
