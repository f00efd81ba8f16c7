use crate::{
    AppState,
    agents::ProgrammerAgent,
    types::{GenerateProgramRequest, ProgramResponse, Result},
};
use axum::{Json, extract::State};

/// Generate a full training program for an athlete.
#[utoipa::path(
    post,
    path = "/api/programs/generate",
    request_body = GenerateProgramRequest,
    responses(
        (status = 200, description = "Generated program", body = ProgramResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Methodology not found"),
        (status = 422, description = "Program schema violation"),
        (status = 502, description = "Completion backend failure")
    ),
    tag = "programs"
)]
pub async fn generate_program(
    State(state): State<AppState>,
    Json(payload): Json<GenerateProgramRequest>,
) -> Result<Json<ProgramResponse>> {
    let llm = state.llm.create_default()?;
    let programmer = ProgrammerAgent::configured(llm, state.store.clone(), &state.config.agents);

    let generated = programmer
        .generate(&payload.profile, &payload.request)
        .await?;

    Ok(Json(ProgramResponse {
        message: format!(
            "Generated a {}-week program using {}",
            generated.program.weeks.len(),
            generated.methodology_used
        ),
        program: generated.program,
        methodology_used: generated.methodology_used,
    }))
}
