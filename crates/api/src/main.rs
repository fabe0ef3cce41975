use std::net::SocketAddr;
use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, StatusCode};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use timetable_api::config::ServerConfig;
use timetable_api::routes;
use timetable_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        solver_url = %config.solver_url,
        solver_timeout_secs = config.solver_timeout_secs,
        "Loaded server configuration"
    );

    // Startup failures are fatal: no point serving without a schema.
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL is not set");
    let pool = timetable_db::create_pool(&database_url)
        .await
        .expect("Cannot open the database pool");
    timetable_db::health_check(&pool)
        .await
        .expect("Database did not answer SELECT 1");
    timetable_db::run_migrations(&pool)
        .await
        .expect("Migrations did not apply");
    tracing::info!("Database ready");

    let addr = SocketAddr::new(
        config.host.parse().expect("HOST is not an IP address"),
        config.port,
    );
    let state = AppState::new(pool, config.clone()).expect("Failed to build solver client");
    let app = build_router(&config, state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Cannot bind the listen address");
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("HTTP server crashed");

    tracing::info!("Server stopped");
}

/// `RUST_LOG` wins; otherwise our crates and tower-http log at debug.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "timetable_api=debug,timetable_pipeline=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Health at the root, everything else under `/api/v1`.
///
/// Layers run outermost-last: CORS sees the request first, the panic
/// catcher sits closest to the handlers.
fn build_router(config: &ServerConfig, state: AppState) -> Router {
    let request_id = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        // Must outlast the solver timeout, or a slow solve is cut off
        // before its run is recorded.
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(build_cors_layer(config))
        .with_state(state)
}

/// Resolves on Ctrl-C, or SIGTERM where signals exist.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Ctrl-C received, draining connections");
        }
        () = terminate => {
            tracing::info!("SIGTERM received, draining connections");
        }
    }
}

/// CORS for the configured front-end origins. An origin that is not a
/// valid header value aborts startup.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .map(|o| {
            o.parse()
                .unwrap_or_else(|e| panic!("Invalid CORS origin '{o}': {e}"))
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
