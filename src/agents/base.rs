use crate::db::Store;
use crate::llm::{CompletionClient, ResponseFormat};
use crate::types::{AgentConversation, AppError, IntentClassification, Result};
use chrono::Utc;
use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Default number of sequential completion attempts.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Shared plumbing composed into every concrete agent.
///
/// Owns the completion client, the retry loop around it, a request-scoped
/// cache, and best-effort conversation logging. The cache lock is only held
/// for synchronous map access, never across an await.
pub struct AgentBase {
    llm: Arc<dyn CompletionClient>,
    store: Arc<dyn Store>,
    temperature: f64,
    max_retries: u32,
    cache: Mutex<HashMap<String, serde_json::Value>>,
}

impl AgentBase {
    pub fn new(llm: Arc<dyn CompletionClient>, store: Arc<dyn Store>, temperature: f64) -> Self {
        Self {
            llm,
            store,
            temperature,
            max_retries: DEFAULT_MAX_RETRIES,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Call the completion client with up to `max_retries` sequential
    /// attempts, re-raising the last error once they are exhausted.
    ///
    /// There is intentionally no delay between attempts; see DESIGN.md for
    /// the open question around backoff.
    pub async fn call_model(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        format: &ResponseFormat,
    ) -> Result<String> {
        let mut last_error = None;

        for attempt in 1..=self.max_retries {
            match self
                .llm
                .complete(system_prompt, user_prompt, self.temperature, format)
                .await
            {
                Ok(text) => {
                    tracing::debug!(attempt, model = self.llm.model_name(), "completion succeeded");
                    return Ok(text);
                }
                Err(e) => {
                    tracing::warn!(
                        attempt,
                        max_retries = self.max_retries,
                        error = %e,
                        "completion attempt failed"
                    );
                    last_error = Some(e);
                }
            }
        }

        tracing::error!(max_retries = self.max_retries, "all completion attempts failed");
        Err(last_error
            .unwrap_or_else(|| AppError::Completion("completion retries exhausted".to_string())))
    }

    /// Get a typed value from the request-scoped cache.
    pub fn cache_get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let cache = self.cache.lock();
        cache
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Store a value in the request-scoped cache.
    pub fn cache_set<T: Serialize>(&self, key: &str, value: &T) {
        if let Ok(json) = serde_json::to_value(value) {
            self.cache.lock().insert(key.to_string(), json);
        }
    }

    /// Append a conversation record to the log.
    ///
    /// Returns the persistence `Result` so call sites decide its fate; on the
    /// request path the dispatcher discards the error with a warning, making
    /// "log failures never fail requests" visible in code structure.
    pub async fn log_conversation(
        &self,
        user_id: &str,
        agent_type: &str,
        user_message: &str,
        agent_response: &str,
        intent_classification: Option<&IntentClassification>,
        context: serde_json::Value,
    ) -> Result<()> {
        let record = AgentConversation {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            agent_type: agent_type.to_string(),
            user_message: user_message.to_string(),
            intent_classification: intent_classification
                .map(serde_json::to_value)
                .transpose()
                .map_err(|e| AppError::Internal(e.to_string()))?,
            agent_response: agent_response.to_string(),
            context,
            created_at: Utc::now(),
        };

        self.store.append_conversation(&record).await?;
        tracing::info!(user_id, agent_type, "conversation logged");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::traits::MockStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Completion client failing a fixed number of times before succeeding.
    struct FlakyClient {
        failures_before_success: u32,
        calls: AtomicU32,
    }

    impl FlakyClient {
        fn new(failures_before_success: u32) -> Self {
            Self {
                failures_before_success,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl CompletionClient for FlakyClient {
        async fn complete(
            &self,
            _system: &str,
            _user: &str,
            _temperature: f64,
            _format: &ResponseFormat,
        ) -> Result<String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures_before_success {
                Err(AppError::Completion("transient failure".to_string()))
            } else {
                Ok("ok".to_string())
            }
        }

        fn model_name(&self) -> &str {
            "flaky-test-model"
        }
    }

    fn base_with(client: FlakyClient, max_retries: u32) -> AgentBase {
        AgentBase::new(Arc::new(client), Arc::new(MockStore::new()), 0.5)
            .with_max_retries(max_retries)
    }

    #[tokio::test]
    async fn retries_until_success_within_budget() {
        let base = base_with(FlakyClient::new(2), 3);
        let result = base.call_model("sys", "user", &ResponseFormat::Text).await;
        assert_eq!(result.unwrap(), "ok");
    }

    #[tokio::test]
    async fn exhausted_retries_reraise_last_error() {
        let base = base_with(FlakyClient::new(5), 3);
        let err = base
            .call_model("sys", "user", &ResponseFormat::Text)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "COMPLETION_ERROR");
    }

    #[tokio::test]
    async fn cache_round_trip_is_idempotent() {
        let base = base_with(FlakyClient::new(0), 1);
        assert!(base.cache_get::<Vec<String>>("exercises_garage_novice").is_none());

        let value = vec!["Competition Squat".to_string()];
        base.cache_set("exercises_garage_novice", &value);

        let first: Vec<String> = base.cache_get("exercises_garage_novice").unwrap();
        let second: Vec<String> = base.cache_get("exercises_garage_novice").unwrap();
        assert_eq!(first, value);
        assert_eq!(second, value);
    }

    #[tokio::test]
    async fn log_conversation_surfaces_store_errors_to_caller() {
        let mut store = MockStore::new();
        store
            .expect_append_conversation()
            .returning(|_| Err(AppError::Database("disk full".to_string())));

        let base = AgentBase::new(Arc::new(FlakyClient::new(0)), Arc::new(store), 0.5);
        let result = base
            .log_conversation(
                "athlete-1",
                "router",
                "hello",
                "hi",
                None,
                serde_json::json!({}),
            )
            .await;
        // The caller decides to swallow this; the base never does it silently.
        assert!(result.is_err());
    }
}
