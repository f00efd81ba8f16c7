#![allow(dead_code)]

//! Shared fixtures for integration tests.
//!
//! Tests exercise the real router stack against an in-memory database and a
//! wiremock-stubbed Gemini endpoint, so the full HTTP and JSON plumbing is
//! covered without a live model.

use ironpath::{
    AppState, create_app,
    db::{LibsqlStore, Store, seed},
    llm::{CompletionFactory, Provider},
    utils::config::{AgentConfig, Config, DatabaseConfig, GeminiConfig, ServerConfig},
};
use axum_test::TestServer;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use wiremock::MockServer;

pub const GEMINI_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

/// Agent settings matching the deployment defaults.
pub fn default_agent_config() -> AgentConfig {
    AgentConfig {
        router_temperature: 0.3,
        programmer_temperature: 0.8,
        analyst_temperature: 0.7,
        feedback_temperature: 0.7,
        max_retries: 3,
    }
}

/// Build a test server backed by a seeded in-memory store and a Gemini
/// provider pointed at the given wiremock server.
pub async fn test_server(gemini: &MockServer) -> TestServer {
    test_server_with_agents(gemini, default_agent_config()).await
}

/// Same as [`test_server`] but with explicit agent settings, for tests that
/// exercise the configuration path (retry budget, temperature).
pub async fn test_server_with_agents(gemini: &MockServer, agents: AgentConfig) -> TestServer {
    let store = LibsqlStore::new_memory()
        .await
        .expect("in-memory store should open");
    seed::seed_if_empty(&store).await.expect("seeding");
    let store: Arc<dyn Store> = Arc::new(store);

    let provider = Provider::Gemini {
        api_key: "test-key".to_string(),
        base_url: gemini.uri(),
        model: "gemini-2.5-flash".to_string(),
        timeout: Duration::from_secs(5),
    };

    let config = Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseConfig { path: None },
        gemini: GeminiConfig {
            api_key: "test-key".to_string(),
            model: "gemini-2.5-flash".to_string(),
            base_url: gemini.uri(),
            timeout_secs: 5,
        },
        agents,
    };

    let state = AppState {
        config: Arc::new(config),
        store,
        llm: Arc::new(CompletionFactory::new(provider)),
    };

    TestServer::new(create_app(state)).expect("test server")
}

/// Wrap text in the Gemini `generateContent` response envelope.
pub fn gemini_envelope(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {
                "parts": [{ "text": text }]
            }
        }]
    })
}

/// A classification document as the router's model call would return it.
pub fn classification_text(intent: &str, suggested_agent: &str) -> String {
    json!({
        "intent": intent,
        "confidence": 0.92,
        "reasoning": "test classification",
        "suggestedAgent": suggested_agent,
        "requiresProgramContext": false,
    })
    .to_string()
}

/// A complete intermediate-lifter profile, as the frontend submits it.
pub fn athlete_profile() -> Value {
    json!({
        "id": "athlete-42",
        "name": "Test Lifter",
        "biometrics": {
            "bodyweight": 82.5,
            "unit": "kg",
            "sex": "male",
            "age": 29
        },
        "oneRepMax": {
            "squat": 180.0,
            "bench": 120.0,
            "deadlift": 220.0
        },
        "trainingAge": "intermediate",
        "weakPoints": ["lockout"],
        "equipmentAccess": "commercial",
        "preferredSessionLength": 90,
        "methodologyId": "linear_progression"
    })
}

/// A minimal valid session for feedback adjustment.
pub fn planned_session() -> Value {
    json!({
        "dayNumber": 2,
        "focus": "bench",
        "exercises": [{
            "name": "Competition Bench Press",
            "sets": 5,
            "reps": "3",
            "rpeTarget": 8.0,
            "restSeconds": 240
        }]
    })
}

/// A small but structurally valid program document, as the programmer's
/// model call would return it.
pub fn program_document_text() -> String {
    json!({
        "id": "prog-1",
        "createdAt": "2026-08-01T00:00:00Z",
        "title": "8-Week Strength Block",
        "weeks": [{
            "weekNumber": 1,
            "sessions": [{
                "dayNumber": 1,
                "focus": "squat",
                "exercises": [{
                    "name": "Competition Squat",
                    "sets": 5,
                    "reps": "5",
                    "rpeTarget": 7.5,
                    "restSeconds": 180
                }]
            }]
        }]
    })
    .to_string()
}
