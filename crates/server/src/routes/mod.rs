//! API route handlers
//!
//! - `health`: liveness, readiness and metrics
//! - `jokes`: serving, priming and pool diagnostics

pub mod health;
pub mod jokes;

use crate::error::{ServerError, ServerResult};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// API version and base info (GET /)
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "jokepool",
        "version": env!("CARGO_PKG_VERSION"),
        "api_version": "v1",
        "endpoints": [
            "GET /api/v1/joke",
            "POST /api/v1/joke",
            "GET /api/v1/pool",
            "/health",
            "/ready",
            "/metrics"
        ]
    })))
}

/// 404 Not Found handler
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
