//! HTTP API handlers and routes, built on the Axum web framework.
//!
//! # API Endpoints
//!
//! ## Agent (`/api/agent`)
//! - `POST /api/agent/message` - Classify intent and route to an agent
//! - `GET /api/agent/conversations/{user_id}` - Conversation history
//!
//! ## Programs (`/api/programs`)
//! - `POST /api/programs/generate` - Generate a full training program
//!
//! ## Feedback (`/api/feedback`)
//! - `POST /api/feedback/adjust` - Adjust a session from athlete feedback
//!
//! ## Progress (`/api/progress`)
//! - `POST /api/progress/check-in` - Analyze a training period
//!
//! ## Readiness (`/api/readiness`)
//! - `POST /api/readiness/check` - Pre-workout readiness score and advice
//!
//! ## Methodologies (`/api/methodologies`)
//! - `GET /api/methodologies/list` - Methodology summaries for selection
//! - `GET /api/methodologies/{methodology_id}` - Full methodology details
//!
//! ## Health (`/api/health`)
//! - `GET /api/health` - Health check endpoint

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;

use crate::types::{
    AdjustWorkoutRequest, AdjustWorkoutResponse, AgentMessageRequest, AgentMessageResponse,
    CheckInAnalysis, CheckInRequest, GenerateProgramRequest, MethodologyDetail, MethodologySummary,
    ProgramResponse, ReadinessCheckRequest, ReadinessCheckResponse,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::agent::handle_agent_message,
        handlers::agent::get_user_conversations,
        handlers::programs::generate_program,
        handlers::feedback::adjust_workout,
        handlers::progress::check_in,
        handlers::readiness::readiness_check,
        handlers::methodologies::list_methodologies,
        handlers::methodologies::get_methodology,
        handlers::health,
    ),
    components(schemas(
        AgentMessageRequest,
        AgentMessageResponse,
        GenerateProgramRequest,
        ProgramResponse,
        AdjustWorkoutRequest,
        AdjustWorkoutResponse,
        CheckInRequest,
        CheckInAnalysis,
        ReadinessCheckRequest,
        ReadinessCheckResponse,
        MethodologyDetail,
        MethodologySummary,
    )),
    tags(
        (name = "agent", description = "Intent routing and conversation history"),
        (name = "programs", description = "Program generation"),
        (name = "feedback", description = "Workout adjustment"),
        (name = "progress", description = "Check-in analysis"),
        (name = "readiness", description = "Pre-workout readiness checks"),
        (name = "methodologies", description = "Training methodology reference data"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;
