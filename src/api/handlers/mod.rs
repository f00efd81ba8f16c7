//! API request handlers.
//!
//! This module contains all HTTP request handlers organized by functionality.

/// Message dispatch and conversation history handlers.
pub mod agent;
/// Workout adjustment handlers.
pub mod feedback;
/// Methodology listing handlers.
pub mod methodologies;
/// Program generation handlers.
pub mod programs;
/// Check-in analysis handlers.
pub mod progress;
/// Pre-workout readiness handlers.
pub mod readiness;

use axum::Json;
use serde_json::json;

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Service is up")),
    tag = "health"
)]
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}
