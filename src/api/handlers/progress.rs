use crate::{
    AppState,
    agents::CheckInAgent,
    types::{AppError, CheckInAnalysis, CheckInRequest, Result},
};
use axum::{Json, extract::State};

/// Analyze a training period and produce check-in insights.
#[utoipa::path(
    post,
    path = "/api/progress/check-in",
    request_body = CheckInRequest,
    responses(
        (status = 200, description = "Check-in analysis", body = CheckInAnalysis),
        (status = 400, description = "Invalid input")
    ),
    tag = "progress"
)]
pub async fn check_in(
    State(state): State<AppState>,
    Json(payload): Json<CheckInRequest>,
) -> Result<Json<CheckInAnalysis>> {
    if payload.check_in_type != "daily" && payload.check_in_type != "weekly" {
        return Err(AppError::InvalidInput(format!(
            "check-in type must be 'daily' or 'weekly', got '{}'",
            payload.check_in_type
        )));
    }

    let llm = state.llm.create_default()?;
    let agent = CheckInAgent::configured(llm, state.store.clone(), &state.config.agents);

    let analysis = agent
        .analyze_progress(
            &payload.check_in_type,
            &payload.metrics,
            &payload.sessions,
            &payload.program,
        )
        .await;

    Ok(Json(analysis))
}
