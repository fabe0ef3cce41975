//! Route definitions for the `/schedules` resource, including solving
//! and the rendered timetable.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{schedule, solve, timetable};
use crate::state::AppState;

/// Routes mounted at `/schedules`.
///
/// ```text
/// GET    /                     -> list
/// POST   /                     -> create
/// GET    /{id}                 -> get_by_id
/// PUT    /{id}                 -> update
/// DELETE /{id}                 -> delete
///
/// POST   /{id}/solve           -> solve::solve
/// GET    /{id}/solver-runs     -> list_solver_runs
/// GET    /{id}/preflight       -> preflight
/// GET    /{id}/assignments     -> list_assignments
/// GET    /{id}/timetable       -> timetable::get_timetable
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(schedule::list).post(schedule::create))
        .route(
            "/{id}",
            get(schedule::get_by_id)
                .put(schedule::update)
                .delete(schedule::delete),
        )
        .route("/{id}/solve", post(solve::solve))
        .route("/{id}/solver-runs", get(schedule::list_solver_runs))
        .route("/{id}/preflight", get(schedule::preflight))
        .route("/{id}/assignments", get(schedule::list_assignments))
        .route("/{id}/timetable", get(timetable::get_timetable))
}
