//! Route definitions for the `/faculty` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::faculty;
use crate::state::AppState;

/// Routes mounted at `/faculty`.
///
/// ```text
/// GET    /                              -> list
/// POST   /                              -> create
/// GET    /{id}                          -> get_by_id
/// PUT    /{id}                          -> update
/// DELETE /{id}                          -> delete
/// POST   /{id}/availability/toggle      -> toggle_availability
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(faculty::list).post(faculty::create))
        .route(
            "/{id}",
            get(faculty::get_by_id).put(faculty::update).delete(faculty::delete),
        )
        .route(
            "/{id}/availability/toggle",
            post(faculty::toggle_availability),
        )
}
