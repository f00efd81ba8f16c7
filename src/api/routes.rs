use crate::AppState;
use axum::{
    Json, Router,
    routing::{get, post},
};
use utoipa::OpenApi;

async fn openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(crate::api::ApiDoc::openapi())
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route(
            "/agent/message",
            post(crate::api::handlers::agent::handle_agent_message),
        )
        .route(
            "/agent/conversations/{user_id}",
            get(crate::api::handlers::agent::get_user_conversations),
        )
        .route(
            "/programs/generate",
            post(crate::api::handlers::programs::generate_program),
        )
        .route(
            "/feedback/adjust",
            post(crate::api::handlers::feedback::adjust_workout),
        )
        .route(
            "/progress/check-in",
            post(crate::api::handlers::progress::check_in),
        )
        .route(
            "/readiness/check",
            post(crate::api::handlers::readiness::readiness_check),
        )
        .route(
            "/methodologies/list",
            get(crate::api::handlers::methodologies::list_methodologies),
        )
        .route(
            "/methodologies/{methodology_id}",
            get(crate::api::handlers::methodologies::get_methodology),
        )
        .route("/health", get(crate::api::handlers::health))
        .route("/openapi.json", get(openapi_spec))
}
