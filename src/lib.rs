//! # IronPath - Powerlifting Coaching Server
//!
//! A multi-agent coaching backend for powerlifting training programs. A
//! router agent classifies each athlete message, and specialized agents
//! handle program generation, read-only coaching advice, workout
//! adjustment, and progress check-ins against a Gemini completion backend.
//!
//! ## Overview
//!
//! IronPath can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `ironpath-server` binary
//! 2. **As a library** - Import components into your own Rust project
//!
//! ### Basic Example
//!
//! ```rust,ignore
//! use ironpath::llm::Provider;
//! use std::time::Duration;
//!
//! let provider = Provider::Gemini {
//!     api_key: "key".to_string(),
//!     base_url: "https://generativelanguage.googleapis.com".to_string(),
//!     model: "gemini-2.5-flash".to_string(),
//!     timeout: Duration::from_secs(30),
//! };
//! let client = provider.create_client()?;
//! # Ok::<(), ironpath::types::AppError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`agents`] - Router, programmer, analyst/mentor, feedback, check-in
//! - [`llm`] - Completion client trait and the Gemini adapter
//! - [`db`] - Store trait, libsql implementation, seed data
//! - [`api`] - Axum routes and handlers
//! - [`math`] - RPE/DOTS powerlifting math
//! - [`types`] - Domain types, wire formats, error taxonomy

/// Specialized coaching agents and their shared base plumbing.
pub mod agents;
/// HTTP API routes and handlers.
pub mod api;
/// Persistence layer.
pub mod db;
/// Completion clients.
pub mod llm;
/// Powerlifting math utilities.
pub mod math;
/// Domain types and errors.
pub mod types;
/// Configuration.
pub mod utils;

use crate::db::Store;
use crate::llm::CompletionFactory;
use crate::utils::Config;
use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

/// Program documents from the frontend stay well under this.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Reference data and the conversation log.
    pub store: Arc<dyn Store>,
    /// Completion client factory.
    pub llm: Arc<CompletionFactory>,
}

/// Build the full application router with middleware applied.
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api::routes::create_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
                .layer(cors),
        )
        .with_state(state)
}
