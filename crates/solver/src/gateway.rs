//! The solver abstraction and its error taxonomy.

use timetable_core::payload::SolvePayload;
use timetable_core::solve_result::SolveResult;

/// Failures talking to the solver. None of these are retried.
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    /// Transport failure: connection refused, DNS, TLS, timeout.
    #[error("Solver unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),

    /// The solver answered with a non-2xx status.
    #[error("Solver rejected the request ({status}): {body}")]
    Rejected {
        status: u16,
        /// Raw response body for diagnostics.
        body: String,
    },

    /// A 2xx response whose body is not a result document.
    #[error("Solver returned an invalid response: {0}")]
    InvalidResponse(String),
}

/// Sends one payload to a solver and returns its result document.
///
/// One call is one solver invocation.
pub trait SolverGateway: Send + Sync {
    fn solve(
        &self,
        payload: &SolvePayload,
    ) -> impl std::future::Future<Output = Result<SolveResult, SolverError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_display_carries_body() {
        let err = SolverError::Rejected {
            status: 422,
            body: "missing time_config".into(),
        };
        assert_eq!(
            err.to_string(),
            "Solver rejected the request (422): missing time_config"
        );
    }

    #[test]
    fn invalid_response_display() {
        let err = SolverError::InvalidResponse("expected value at line 1".into());
        assert!(err.to_string().starts_with("Solver returned an invalid response"));
    }
}
