use crate::types::{AppError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Response mode requested from the provider.
#[derive(Debug, Clone)]
pub enum ResponseFormat {
    /// Free-text completion.
    Text,
    /// JSON completion, optionally constrained by a response schema.
    Json { schema: Option<serde_json::Value> },
}

impl ResponseFormat {
    /// MIME type the provider expects for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ResponseFormat::Text => "text/plain",
            ResponseFormat::Json { .. } => "application/json",
        }
    }
}

/// Generic completion client trait for provider abstraction.
///
/// One outbound network call per invocation. Implementations fail on
/// transport errors and empty responses; they never retry.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Request a completion for a system/user prompt pair.
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f64,
        format: &ResponseFormat,
    ) -> Result<String>;

    /// Get the model name/identifier.
    fn model_name(&self) -> &str;
}

/// Provider enum for runtime selection.
#[derive(Debug, Clone)]
pub enum Provider {
    /// Google Gemini REST API (`generateContent`).
    Gemini {
        api_key: String,
        /// API base, e.g. `https://generativelanguage.googleapis.com`.
        /// Overridable so tests can point at a stub server.
        base_url: String,
        model: String,
        /// Per-call request timeout.
        timeout: Duration,
    },
}

impl Provider {
    /// Create a client instance for this provider.
    pub fn create_client(&self) -> Result<Arc<dyn CompletionClient>> {
        match self {
            Provider::Gemini {
                api_key,
                base_url,
                model,
                timeout,
            } => {
                if api_key.is_empty() {
                    return Err(AppError::Completion(
                        "Gemini API key is not configured".to_string(),
                    ));
                }
                Ok(Arc::new(super::gemini::GeminiClient::new(
                    api_key.clone(),
                    base_url.clone(),
                    model.clone(),
                    *timeout,
                )?))
            }
        }
    }

    /// Get a human-readable name for this provider.
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Gemini { .. } => "Gemini",
        }
    }
}

/// Factory handing each request a fresh client for the configured provider.
pub struct CompletionFactory {
    default_provider: Provider,
}

impl CompletionFactory {
    pub fn new(default_provider: Provider) -> Self {
        Self { default_provider }
    }

    /// Create a client using the default provider.
    pub fn create_default(&self) -> Result<Arc<dyn CompletionClient>> {
        self.default_provider.create_client()
    }

    pub fn default_provider(&self) -> &Provider {
        &self.default_provider
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gemini_provider(api_key: &str) -> Provider {
        Provider::Gemini {
            api_key: api_key.to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.5-flash".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    #[test]
    fn test_provider_name() {
        assert_eq!(gemini_provider("key").name(), "Gemini");
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let err = match gemini_provider("").create_client() {
            Ok(_) => panic!("expected error"),
            Err(e) => e.to_string(),
        };
        assert!(err.contains("API key"));
    }

    #[test]
    fn test_factory_default_provider() {
        let factory = CompletionFactory::new(gemini_provider("key"));
        assert_eq!(factory.default_provider().name(), "Gemini");
        assert!(factory.create_default().is_ok());
    }

    #[test]
    fn test_response_format_mime_types() {
        assert_eq!(ResponseFormat::Text.mime_type(), "text/plain");
        assert_eq!(
            ResponseFormat::Json { schema: None }.mime_type(),
            "application/json"
        );
    }
}
