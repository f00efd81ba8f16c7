use crate::llm::client::{CompletionClient, ResponseFormat};
use crate::types::{AppError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Client for the Gemini `generateContent` REST endpoint.
///
/// The completion provider may hang, so the underlying reqwest client
/// carries a per-request timeout.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(
        api_key: String,
        base_url: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Completion(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    fn build_body(
        system_prompt: &str,
        user_prompt: &str,
        temperature: f64,
        format: &ResponseFormat,
    ) -> serde_json::Value {
        let mut generation_config = json!({
            "temperature": temperature,
            "responseMimeType": format.mime_type(),
        });
        if let ResponseFormat::Json {
            schema: Some(schema),
        } = format
        {
            generation_config["responseSchema"] = schema.clone();
        }

        json!({
            "systemInstruction": {
                "parts": [{ "text": system_prompt }]
            },
            "contents": [{
                "role": "user",
                "parts": [{ "text": user_prompt }]
            }],
            "generationConfig": generation_config,
        })
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f64,
        format: &ResponseFormat,
    ) -> Result<String> {
        let body = Self::build_body(system_prompt, user_prompt, temperature, format);

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Completion(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::Completion(format!(
                "Gemini API returned {}: {}",
                status, detail
            )));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AppError::Completion(format!("Invalid Gemini response body: {}", e)))?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .unwrap_or_default();

        if text.is_empty() {
            return Err(AppError::Completion(
                "Empty response from Gemini".to_string(),
            ));
        }

        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_carries_schema_only_for_json_format() {
        let text_body = GeminiClient::build_body("sys", "user", 0.7, &ResponseFormat::Text);
        assert_eq!(
            text_body["generationConfig"]["responseMimeType"],
            "text/plain"
        );
        assert!(text_body["generationConfig"]["responseSchema"].is_null());

        let schema = json!({"type": "object"});
        let json_body = GeminiClient::build_body(
            "sys",
            "user",
            0.3,
            &ResponseFormat::Json {
                schema: Some(schema.clone()),
            },
        );
        assert_eq!(json_body["generationConfig"]["responseSchema"], schema);
        assert_eq!(json_body["generationConfig"]["temperature"], 0.3);
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        let client = GeminiClient::new(
            "key".to_string(),
            "http://localhost:9999/".to_string(),
            "gemini-2.5-flash".to_string(),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            client.endpoint(),
            "http://localhost:9999/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }
}
