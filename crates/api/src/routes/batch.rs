//! Route definitions for the `/batches` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::batch;
use crate::state::AppState;

/// Routes mounted at `/batches`.
///
/// ```text
/// GET    /        -> list
/// POST   /        -> create
/// GET    /{id}    -> get_by_id
/// PUT    /{id}    -> update
/// DELETE /{id}    -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(batch::list).post(batch::create))
        .route(
            "/{id}",
            get(batch::get_by_id).put(batch::update).delete(batch::delete),
        )
}
