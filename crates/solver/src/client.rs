//! HTTP client for the external solver service.

use std::time::Duration;

use timetable_core::payload::SolvePayload;
use timetable_core::solve_result::SolveResult;

use crate::gateway::{SolverError, SolverGateway};

/// Posts payloads to `{base_url}/solve`.
pub struct SolverClient {
    client: reqwest::Client,
    base_url: String,
}

impl SolverClient {
    /// Create a client whose requests give up after `timeout`.
    ///
    /// * `base_url` - e.g. `http://localhost:8000`. A trailing slash is
    ///   ignored.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SolverError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn solve_url(&self) -> String {
        format!("{}/solve", self.base_url)
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or [`SolverError::Rejected`]
    /// carrying the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, SolverError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(SolverError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

impl SolverGateway for SolverClient {
    async fn solve(&self, payload: &SolvePayload) -> Result<SolveResult, SolverError> {
        tracing::debug!(
            schedule_id = payload.schedule_id,
            url = %self.solve_url(),
            "Sending payload to solver"
        );

        let response = self
            .client
            .post(self.solve_url())
            .json(payload)
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;

        let bytes = response.bytes().await?;
        serde_json::from_slice::<SolveResult>(&bytes)
            .map_err(|e| SolverError::InvalidResponse(e.to_string()))
    }
}
