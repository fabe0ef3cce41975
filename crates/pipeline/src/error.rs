use timetable_core::error::CoreError;
use timetable_core::types::DbId;
use timetable_solver::SolverError;

/// Why a solve attempt did not complete. The display text is what gets
/// recorded on the solver run.
#[derive(Debug, thiserror::Error)]
pub enum SolveError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// Missing or invalid time configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The schedule's status does not allow solving.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Solver(#[from] SolverError),

    /// Storage failure or a result that cannot be written. Nothing was
    /// applied.
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("A solve is already in progress for schedule {schedule_id}")]
    SolveInProgress { schedule_id: DbId },
}

impl From<sqlx::Error> for SolveError {
    fn from(err: sqlx::Error) -> Self {
        SolveError::Persistence(err.to_string())
    }
}

impl From<CoreError> for SolveError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { entity, id } => SolveError::NotFound { entity, id },
            CoreError::Configuration(msg) | CoreError::Validation(msg) => {
                SolveError::Configuration(msg)
            }
            CoreError::Conflict(msg) => SolveError::Conflict(msg),
            CoreError::Internal(msg) => SolveError::Persistence(msg),
        }
    }
}
