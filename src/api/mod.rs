//! API module
//!
//! Contains HTTP request handlers and the application router.

pub mod upload;

use crate::state::AppState;
use axum::{
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

#[derive(Serialize)]
struct HelloResponse {
    message: String,
    status: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    message: String,
}

/// Build the application router (routes only; middleware layers are added by
/// the binary so tests can drive the routes directly)
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(hello_world))
        .route("/api/health", get(health_check))
        .route("/upload", post(upload::upload))
        .with_state(state)
}

async fn hello_world() -> Json<HelloResponse> {
    Json(HelloResponse {
        message: "Hello from Study Notes Backend!".to_string(),
        status: "ok".to_string(),
    })
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        message: "Backend is healthy".to_string(),
    })
}
