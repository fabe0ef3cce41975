use std::sync::Arc;

use timetable_pipeline::{PgSolveStore, SolveOrchestrator};
use timetable_solver::SolverClient;

use crate::config::ServerConfig;

/// The orchestrator wired to Postgres and the HTTP solver.
pub type Solver = SolveOrchestrator<PgSolveStore, SolverClient>;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; inner data is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: timetable_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Solve pipeline used by `POST /schedules/{id}/solve`.
    pub solver: Arc<Solver>,
}

impl AppState {
    /// Build state from a pool and configuration, constructing the solver
    /// client from `config`.
    pub fn new(
        pool: timetable_db::DbPool,
        config: ServerConfig,
    ) -> Result<Self, timetable_solver::SolverError> {
        let client = SolverClient::new(config.solver_url.clone(), config.solver_timeout())?;
        let store = PgSolveStore::new(pool.clone(), config.solve_token_stale_after());
        Ok(Self {
            pool,
            config: Arc::new(config),
            solver: Arc::new(SolveOrchestrator::new(store, client)),
        })
    }
}
