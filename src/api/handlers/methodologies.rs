use crate::{
    AppState,
    types::{AppError, MethodologyDetail, MethodologySummary, Result},
};
use axum::{
    Json,
    extract::{Path, State},
};

/// List the available training methodologies.
///
/// Returns summaries only; the prompt template and rule payloads stay
/// server-side. This is the list an athlete picks a `methodologyId` from.
#[utoipa::path(
    get,
    path = "/api/methodologies/list",
    responses(
        (status = 200, description = "Methodology summaries, ordered by name", body = [MethodologySummary]),
        (status = 500, description = "Database failure")
    ),
    tag = "methodologies"
)]
pub async fn list_methodologies(
    State(state): State<AppState>,
) -> Result<Json<Vec<MethodologySummary>>> {
    let methodologies = state.store.list_methodologies().await?;
    Ok(Json(
        methodologies.iter().map(MethodologySummary::from).collect(),
    ))
}

/// Full details for one methodology, including its programming rules and
/// knowledge base.
#[utoipa::path(
    get,
    path = "/api/methodologies/{methodology_id}",
    params(("methodology_id" = String, Path, description = "Methodology to fetch")),
    responses(
        (status = 200, description = "Complete methodology record", body = MethodologyDetail),
        (status = 404, description = "Unknown methodology id")
    ),
    tag = "methodologies"
)]
pub async fn get_methodology(
    State(state): State<AppState>,
    Path(methodology_id): Path<String>,
) -> Result<Json<MethodologyDetail>> {
    let methodology = state
        .store
        .get_methodology(&methodology_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Methodology not found: {}", methodology_id)))?;

    Ok(Json(methodology.into()))
}
