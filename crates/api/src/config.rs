use std::time::Duration;

/// Extra time a solve token is honoured past the solver timeout before
/// another request may take it over.
const SOLVE_TOKEN_GRACE_SECS: u64 = 30;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development except the
/// database URL, which `main` reads separately.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `120`).
    pub request_timeout_secs: u64,
    /// Base URL of the external solver service.
    pub solver_url: String,
    /// Upper bound on one solver call in seconds (default: `90`).
    pub solver_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:3000`    |
    /// | `REQUEST_TIMEOUT_SECS` | `120`                      |
    /// | `SOLVER_URL`           | `http://localhost:8000`    |
    /// | `SOLVER_TIMEOUT_SECS`  | `90`                       |
    ///
    /// Panics if the solver timeout is not shorter than the request
    /// timeout: the solve endpoint must be able to record a timed-out
    /// call before the HTTP layer gives up on the request.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let solver_url =
            std::env::var("SOLVER_URL").unwrap_or_else(|_| "http://localhost:8000".into());

        let solver_timeout_secs: u64 = std::env::var("SOLVER_TIMEOUT_SECS")
            .unwrap_or_else(|_| "90".into())
            .parse()
            .expect("SOLVER_TIMEOUT_SECS must be a valid u64");

        assert!(
            solver_timeout_secs < request_timeout_secs,
            "SOLVER_TIMEOUT_SECS ({solver_timeout_secs}) must be shorter than \
             REQUEST_TIMEOUT_SECS ({request_timeout_secs})"
        );

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            solver_url,
            solver_timeout_secs,
        }
    }

    pub fn solver_timeout(&self) -> Duration {
        Duration::from_secs(self.solver_timeout_secs)
    }

    /// Age after which a held solve token is treated as abandoned.
    pub fn solve_token_stale_after(&self) -> Duration {
        Duration::from_secs(self.solver_timeout_secs + SOLVE_TOKEN_GRACE_SECS)
    }
}
