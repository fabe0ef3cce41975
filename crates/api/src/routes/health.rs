//! Liveness endpoint. Mounted at the root, outside `/api/v1`, so load
//! balancers can reach it without knowing the API prefix.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Reachability of a backing service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Reachability {
    Up,
    Down,
}

#[derive(Serialize)]
pub struct Health {
    /// `"ok"` when every backing service is up, `"degraded"` otherwise.
    pub status: &'static str,
    pub version: &'static str,
    pub database: Reachability,
}

/// GET /health
///
/// Always answers 200; a broken database shows up in the body only.
async fn health(State(state): State<AppState>) -> Json<Health> {
    let database = match timetable_db::health_check(&state.pool).await {
        Ok(()) => Reachability::Up,
        Err(e) => {
            tracing::warn!(error = %e, "Database unreachable from health check");
            Reachability::Down
        }
    };

    Json(Health {
        status: match database {
            Reachability::Up => "ok",
            Reachability::Down => "degraded",
        },
        version: env!("CARGO_PKG_VERSION"),
        database,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
