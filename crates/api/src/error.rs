use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use timetable_core::error::CoreError;
use timetable_pipeline::SolveError;
use timetable_solver::SolverError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`SolveError`] for the solve
/// pipeline, and adds HTTP-specific variants. Implements [`IntoResponse`]
/// to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `timetable_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A failed solve attempt.
    #[error(transparent)]
    Solve(#[from] SolveError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

type Classified = (StatusCode, &'static str, String);

fn internal(msg: &str) -> Classified {
    tracing::error!(error = %msg, "Internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => classify_core_error(core),

            // --- Solve pipeline ---
            AppError::Solve(err) => classify_solve_error(err),

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => internal(msg),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn classify_core_error(err: &CoreError) -> Classified {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Configuration(msg) => {
            (StatusCode::BAD_REQUEST, "CONFIGURATION_ERROR", msg.clone())
        }
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Internal(msg) => internal(msg),
    }
}

/// Classify a solve failure.
///
/// Solver transport and protocol failures map to 502; the message is kept
/// because it is the same text recorded on the solver run.
fn classify_solve_error(err: &SolveError) -> Classified {
    match err {
        SolveError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        SolveError::Configuration(msg) => {
            (StatusCode::BAD_REQUEST, "CONFIGURATION_ERROR", msg.clone())
        }
        SolveError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        SolveError::SolveInProgress { .. } => {
            (StatusCode::CONFLICT, "SOLVE_IN_PROGRESS", err.to_string())
        }
        SolveError::Solver(solver) => {
            let code = match solver {
                SolverError::Unreachable(_) => "SOLVER_UNREACHABLE",
                SolverError::Rejected { .. } => "SOLVER_REJECTED",
                SolverError::InvalidResponse(_) => "SOLVER_INVALID_RESPONSE",
            };
            tracing::warn!(error = %solver, "Solver call failed");
            (StatusCode::BAD_GATEWAY, code, solver.to_string())
        }
        SolveError::Persistence(msg) => {
            tracing::error!(error = %msg, "Solve result could not be persisted");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "PERSISTENCE_ERROR",
                "The solver result could not be saved".to_string(),
            )
        }
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Foreign key violations map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> Classified {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            let constraint = db_err.constraint().unwrap_or("unknown");
            match db_err.code().as_deref() {
                // PostgreSQL unique constraint violation
                Some("23505") if constraint.starts_with("uq_") => {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
                // PostgreSQL foreign key violation
                Some("23503") => {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Referenced entity does not exist or is still in use: {constraint}"),
                    );
                }
                _ => {}
            }
            internal(&db_err.to_string())
        }
        other => internal(&other.to_string()),
    }
}
