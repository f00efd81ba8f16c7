use crate::{
    AppState,
    agents::{Agent, AnalystMentorAgent, RouterAgent},
    types::{
        AgentContext, AgentInput, AgentMessageRequest, AgentMessageResponse, AgentType, Result,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

/// Route a user message to the appropriate specialized agent.
#[utoipa::path(
    post,
    path = "/api/agent/message",
    request_body = AgentMessageRequest,
    responses(
        (status = 200, description = "Routed agent response", body = AgentMessageResponse),
        (status = 400, description = "Invalid input"),
        (status = 422, description = "Classification schema violation"),
        (status = 502, description = "Completion backend failure")
    ),
    tag = "agent"
)]
pub async fn handle_agent_message(
    State(state): State<AppState>,
    Json(payload): Json<AgentMessageRequest>,
) -> Result<Json<AgentMessageResponse>> {
    tracing::info!(user_id = %payload.profile.id, "received agent message");

    let llm = state.llm.create_default()?;
    let router = RouterAgent::configured(llm.clone(), state.store.clone(), &state.config.agents);

    let context = AgentContext {
        profile: Some(payload.profile.clone()),
        has_program: payload.current_program_id.is_some(),
        methodology_id: payload.profile.methodology_id.clone(),
        ..Default::default()
    };

    let classification = router.classify(&payload.message, &context).await?;
    tracing::info!(
        intent = classification.intent.as_str(),
        confidence = classification.confidence,
        "intent classified"
    );

    // Exactly one branch handles the message. The programmer and feedback
    // flows have dedicated endpoints, so those intents return redirect stubs.
    let (agent_used, agent_response) = if RouterAgent::should_route_to_programmer(&classification) {
        (
            AgentType::Programmer,
            json!({
                "message": "To generate a new program, please use the program generation wizard.",
                "requiresProgramGeneration": true,
            }),
        )
    } else if RouterAgent::should_route_to_feedback(&classification) {
        (
            AgentType::Feedback,
            json!({
                "message": "To adjust your workout, please use the feedback form in your program view.",
                "requiresFeedbackForm": true,
            }),
        )
    } else {
        // Analyst handles its own intents and any unmatched classification.
        let analyst =
            AnalystMentorAgent::configured(llm, state.store.clone(), &state.config.agents);
        let input = AgentInput {
            message: payload.message.clone(),
        };
        let response = analyst.process(&input, &context).await?;
        (AgentType::AnalystMentor, response)
    };

    // Best-effort: a log failure never fails the request.
    let log_context = json!({
        "hasProgram": payload.current_program_id.is_some(),
        "methodologyId": payload.profile.methodology_id,
    });
    if let Err(e) = router
        .base()
        .log_conversation(
            &payload.profile.id,
            agent_used.as_str(),
            &payload.message,
            &agent_response.to_string(),
            Some(&classification),
            log_context,
        )
        .await
    {
        tracing::warn!(error = %e, "failed to log conversation");
    }

    Ok(Json(AgentMessageResponse {
        agent_used: agent_used.as_str().to_string(),
        intent_classification: classification,
        response: agent_response,
        timestamp: Utc::now().to_rfc3339(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ConversationQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    50
}

/// Conversation history for a user, newest first.
#[utoipa::path(
    get,
    path = "/api/agent/conversations/{user_id}",
    params(
        ("user_id" = String, Path, description = "User to fetch history for"),
        ("limit" = Option<u32>, Query, description = "Maximum records returned")
    ),
    responses(
        (status = 200, description = "Conversation records, newest first"),
        (status = 500, description = "Database failure")
    ),
    tag = "agent"
)]
pub async fn get_user_conversations(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<ConversationQuery>,
) -> Result<Json<serde_json::Value>> {
    let conversations = state
        .store
        .conversations_for_user(&user_id, query.limit)
        .await?;

    let records: Vec<serde_json::Value> = conversations
        .iter()
        .map(|c| {
            json!({
                "id": c.id,
                "agentType": c.agent_type,
                "userMessage": c.user_message,
                "intentClassification": c.intent_classification,
                "agentResponse": c.agent_response,
                "context": c.context,
                "createdAt": c.created_at.to_rfc3339(),
            })
        })
        .collect();

    Ok(Json(json!({
        "userId": user_id,
        "conversations": records,
        "count": records.len(),
    })))
}
