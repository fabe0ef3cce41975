#![allow(dead_code)]

use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, StatusCode};
use axum::response::Response;
use axum::routing::post;
use axum::{Json, Router};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use timetable_api::config::ServerConfig;
use timetable_api::routes;
use timetable_api::state::AppState;

/// A port nothing listens on; solver calls fail with a connection error.
pub const UNREACHABLE_SOLVER: &str = "http://127.0.0.1:9";

/// Serve a stub solver that places the first section of the payload on
/// Monday at `slot_index`, using the first faculty member, room and batch.
pub async fn stub_solver(slot_index: u32) -> String {
    let app = Router::new().route(
        "/solve",
        post(move |Json(payload): Json<serde_json::Value>| async move {
            Json(serde_json::json!({
                "status": "SUCCESS",
                "solve_time_ms": 850,
                "total_score": -1.5,
                "assignments": [{
                    "section_id": payload["courses"][0]["sections"][0]["id"],
                    "lab_group_id": null,
                    "faculty_id": payload["faculty"][0]["id"],
                    "room_id": payload["rooms"][0]["id"],
                    "batch_id": payload["batches"][0]["id"],
                    "day": "MON",
                    "slot_index": slot_index,
                    "duration": 1,
                    "course_code": payload["courses"][0]["code"],
                    "course_name": payload["courses"][0]["name"],
                    "start_time": "00:00",
                    "end_time": "00:00"
                }],
                "diagnostics": {"hard_score": 0, "soft_score": -1.5, "reasons": []}
            }))
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Build a test `ServerConfig` pointing at `solver_url`.
pub fn test_config(solver_url: &str) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        solver_url: solver_url.to_string(),
        solver_timeout_secs: 5,
    }
}

/// Build the full application router with an unreachable solver.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_solver(pool, UNREACHABLE_SOLVER)
}

/// Build the full application router with all middleware layers.
///
/// Mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack production uses.
pub fn build_test_app_with_solver(pool: PgPool, solver_url: &str) -> Router {
    let state = AppState::new(pool, test_config(solver_url)).unwrap();

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:3000".parse().unwrap()])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None).await
}

pub async fn delete(app: Router, uri: &str) -> Response {
    send(app, Method::DELETE, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Domain fixtures
// ---------------------------------------------------------------------------

pub fn standard_time_config() -> serde_json::Value {
    serde_json::json!({
        "days": ["MON", "TUE", "WED", "THU", "FRI"],
        "start_time": "09:00",
        "end_time": "17:00",
        "slot_duration": 60,
        "break_start": "12:00",
        "break_end": "13:00"
    })
}

/// IDs of a small consistent domain created through the API.
#[derive(Debug, Clone, Copy)]
pub struct Seeded {
    pub course_id: i64,
    pub section_id: i64,
    pub faculty_id: i64,
    pub room_id: i64,
    pub batch_id: i64,
    pub schedule_id: i64,
}

async fn create(pool: &PgPool, uri: &str, body: serde_json::Value) -> serde_json::Value {
    let response = post_json(build_test_app(pool.clone()), uri, body).await;
    assert_eq!(response.status(), StatusCode::CREATED, "POST {uri}");
    body_json(response).await
}

/// One lecture course with section A, a qualified faculty member, a
/// lecture room, a batch enrolled in the section, and a Draft schedule on
/// the standard grid.
pub async fn seed(pool: &PgPool) -> Seeded {
    let course = create(
        pool,
        "/api/v1/courses",
        serde_json::json!({
            "code": "CS101", "name": "Programming", "type": "LECTURE",
            "hours_per_week": 3, "sessions_per_week": 3, "sections": ["A"]
        }),
    )
    .await;
    let course_id = course["id"].as_i64().unwrap();
    let section_id = course["sections"][0]["id"].as_i64().unwrap();

    let faculty = create(
        pool,
        "/api/v1/faculty",
        serde_json::json!({
            "name": "Ada Lovelace", "email": "ada@example.edu", "type": "FULLTIME",
            "max_hours": 18, "course_ids": [course_id]
        }),
    )
    .await;
    let room = create(
        pool,
        "/api/v1/rooms",
        serde_json::json!({"name": "R101", "type": "LECTURE", "capacity": 60}),
    )
    .await;
    let batch = create(
        pool,
        "/api/v1/batches",
        serde_json::json!({"name": "CSE-1", "student_count": 55, "section_ids": [section_id]}),
    )
    .await;
    let schedule = create(
        pool,
        "/api/v1/schedules",
        serde_json::json!({
            "name": "Autumn", "semester": "2025-1", "time_config": standard_time_config()
        }),
    )
    .await;

    Seeded {
        course_id,
        section_id,
        faculty_id: faculty["id"].as_i64().unwrap(),
        room_id: room["id"].as_i64().unwrap(),
        batch_id: batch["id"].as_i64().unwrap(),
        schedule_id: schedule["id"].as_i64().unwrap(),
    }
}
