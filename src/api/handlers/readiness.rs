use crate::{
    AppState,
    math::{ReadinessAdjustment, calculate_readiness, readiness_adjustment},
    types::{AppError, ReadinessCheckRequest, ReadinessCheckResponse, Result},
};
use axum::{Json, extract::State};
use chrono::Utc;
use uuid::Uuid;

fn validate_metric(name: &str, value: u8) -> Result<()> {
    if !(1..=5).contains(&value) {
        return Err(AppError::InvalidInput(format!(
            "{} must be between 1 and 5, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Pre-workout readiness check for autoregulation.
///
/// Scores sleep, stress, and soreness into a weighted 0..=1 readiness value
/// and maps it onto an adjustment recommendation. The check is stateless;
/// the score and advice are derived entirely from the submitted metrics.
#[utoipa::path(
    post,
    path = "/api/readiness/check",
    request_body = ReadinessCheckRequest,
    responses(
        (status = 200, description = "Readiness score and recommendation", body = ReadinessCheckResponse),
        (status = 400, description = "Metric outside the 1-5 scale")
    ),
    tag = "readiness"
)]
pub async fn readiness_check(
    State(_state): State<AppState>,
    Json(payload): Json<ReadinessCheckRequest>,
) -> Result<Json<ReadinessCheckResponse>> {
    validate_metric("sleepQuality", payload.sleep_quality)?;
    validate_metric("stressLevel", payload.stress_level)?;
    validate_metric("sorenessFatigue", payload.soreness_fatigue)?;

    let score = calculate_readiness(
        payload.sleep_quality,
        payload.stress_level,
        payload.soreness_fatigue,
    );

    let (should_adjust, adjustment_type, recommendation) = match readiness_adjustment(score) {
        ReadinessAdjustment::ReduceVolume => (
            true,
            Some("reduce_volume".to_string()),
            "Your readiness is low. Consider reducing volume by 30-40% \
             (remove 1-2 sets per exercise) or switch to a light recovery session \
             with mobility work and technique practice."
                .to_string(),
        ),
        ReadinessAdjustment::ReduceIntensity => (
            true,
            Some("reduce_intensity".to_string()),
            "Your readiness is moderate. Consider reducing intensity by backing off \
             RPE by 1 point (e.g., RPE 8 to RPE 7) or cutting 1-2 sets from each \
             exercise. Focus on quality over quantity today."
                .to_string(),
        ),
        ReadinessAdjustment::Proceed => (
            false,
            None,
            format!(
                "Your readiness is good (score: {:.2}). \
                 Proceed with your planned workout. You're ready to train hard!",
                score
            ),
        ),
    };

    tracing::info!(
        user_id = %payload.user_id,
        score,
        should_adjust,
        "readiness check complete"
    );

    Ok(Json(ReadinessCheckResponse {
        check_id: Uuid::new_v4().to_string(),
        overall_readiness: score,
        recommendation,
        should_adjust_workout: should_adjust,
        adjustment_type,
        timestamp: Utc::now().to_rfc3339(),
    }))
}
