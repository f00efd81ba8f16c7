use crate::{
    AppState,
    agents::FeedbackAgent,
    types::{AdjustWorkoutRequest, AdjustWorkoutResponse, AppError, Result},
};
use axum::{Json, extract::State};

/// Adjust a planned session from athlete feedback.
///
/// The adjustment itself never hard-fails: when the model is unreachable or
/// returns garbage, the original session comes back with the reason
/// explaining why.
#[utoipa::path(
    post,
    path = "/api/feedback/adjust",
    request_body = AdjustWorkoutRequest,
    responses(
        (status = 200, description = "Adjusted (or original) session", body = AdjustWorkoutResponse),
        (status = 400, description = "Invalid input")
    ),
    tag = "feedback"
)]
pub async fn adjust_workout(
    State(state): State<AppState>,
    Json(payload): Json<AdjustWorkoutRequest>,
) -> Result<Json<AdjustWorkoutResponse>> {
    if payload.categories.is_empty() {
        return Err(AppError::InvalidInput(
            "at least one feedback category is required".to_string(),
        ));
    }

    let llm = state.llm.create_default()?;
    let agent = FeedbackAgent::configured(llm, state.store.clone(), &state.config.agents);

    let (adjusted_session, reason) = agent
        .adjust_workout(
            &payload.session,
            &payload.categories,
            payload.feedback_text.as_deref(),
        )
        .await;

    Ok(Json(AdjustWorkoutResponse {
        adjusted_session,
        reason,
    }))
}
