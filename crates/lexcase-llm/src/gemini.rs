//! Gemini Provider Implementation
//!
//! Calls the Google Generative Language `generateContent` endpoint.
//!
//! # Features
//!
//! - Async HTTP communication via `reqwest`
//! - Configurable endpoint, model and API key
//! - Single attempt per call; failures go straight back to the caller
//!
//! # Examples
//!
//! ```no_run
//! use lexcase_llm::GeminiProvider;
//!
//! let provider = GeminiProvider::new("gemini-1.5-flash")
//!     .with_api_key("my-key");
//! ```

use crate::{CompletionProvider, GenerationConfig, LlmError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default Generative Language API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Environment variable consulted when no key is set explicitly
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Gemini completion provider
pub struct GeminiProvider {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<GeminiPromptFeedback>,
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiPromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

impl GeminiProvider {
    /// Create a provider for `model`, reading the key from `GEMINI_API_KEY`
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: model.into(),
            api_key: std::env::var(API_KEY_ENV).ok().filter(|k| !k.trim().is_empty()),
            client: reqwest::Client::new(),
        }
    }

    /// Set the API key, overriding the environment
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        self.api_key = if api_key.trim().is_empty() {
            None
        } else {
            Some(api_key)
        };
        self
    }

    /// Point the provider at a different API root
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    fn build_request(prompt: &str, config: &GenerationConfig) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: config.temperature,
                max_output_tokens: config.max_output_tokens,
            },
        }
    }

    /// Pull the generated text out of a decoded response body
    fn response_text(response: GeminiResponse) -> Result<String, LlmError> {
        if let Some(error) = response.error {
            return Err(LlmError::Service(error.message));
        }

        let candidate = match response.candidates.and_then(|c| c.into_iter().next()) {
            Some(candidate) => candidate,
            None => {
                let reason = response
                    .prompt_feedback
                    .and_then(|f| f.block_reason)
                    .unwrap_or_else(|| "no candidates returned".to_string());
                return Err(LlmError::Service(format!("Prompt rejected: {}", reason)));
            }
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(LlmError::InvalidResponse(format!(
                "Empty completion (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        if let Some(reason) = candidate.finish_reason.as_deref() {
            if reason == "MAX_TOKENS" {
                debug!("Gemini completion hit the output token cap");
            }
        }

        Ok(text)
    }
}

#[async_trait]
impl CompletionProvider for GeminiProvider {
    fn model(&self) -> &str {
        &self.model
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<String, LlmError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            LlmError::NotConfigured(format!("{} not set", API_KEY_ENV))
        })?;

        let request = Self::build_request(prompt, config);

        debug!(model = %self.model, prompt_len = prompt.len(), "Sending completion request");

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiResponse>(&body)
                .ok()
                .and_then(|r| r.error)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(LlmError::Service(format!("HTTP {}: {}", status, message)));
        }

        let body: GeminiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        Self::response_text(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemini_provider_creation() {
        let provider = GeminiProvider::new("gemini-1.5-pro").with_api_key("key");
        assert_eq!(provider.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(provider.model(), "gemini-1.5-pro");
        assert!(provider.is_configured());
    }

    #[test]
    fn test_blank_api_key_is_unconfigured() {
        let provider = GeminiProvider::new(DEFAULT_MODEL).with_api_key("   ");
        assert!(!provider.is_configured());
    }

    #[test]
    fn test_url_uses_endpoint_and_model() {
        let provider = GeminiProvider::new("gemini-1.5-flash")
            .with_endpoint("http://localhost:9999/v1beta/");
        assert_eq!(
            provider.url(),
            "http://localhost:9999/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn test_request_serialization() {
        let config = GenerationConfig {
            max_output_tokens: 2000,
            temperature: 0.5,
        };
        let request = GeminiProvider::build_request("Explain consideration", &config);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["contents"][0]["parts"][0]["text"], "Explain consideration");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 2000);
        assert_eq!(json["generationConfig"]["temperature"], 0.5);
    }

    #[test]
    fn test_response_text_joins_parts() {
        let body = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "Hello, "}, {"text": "counsel."}]},
                "finishReason": "STOP"
            }]
        }"#;
        let response: GeminiResponse = serde_json::from_str(body).unwrap();
        assert_eq!(GeminiProvider::response_text(response).unwrap(), "Hello, counsel.");
    }

    #[test]
    fn test_response_error_body() {
        let body = r#"{"error": {"message": "API key not valid"}}"#;
        let response: GeminiResponse = serde_json::from_str(body).unwrap();
        match GeminiProvider::response_text(response) {
            Err(LlmError::Service(message)) => assert_eq!(message, "API key not valid"),
            other => panic!("Expected Service error, got {:?}", other),
        }
    }

    #[test]
    fn test_blocked_prompt() {
        let body = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let response: GeminiResponse = serde_json::from_str(body).unwrap();
        match GeminiProvider::response_text(response) {
            Err(LlmError::Service(message)) => assert!(message.contains("SAFETY")),
            other => panic!("Expected Service error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_candidate_is_invalid() {
        let body = r#"{"candidates": [{"finishReason": "MAX_TOKENS"}]}"#;
        let response: GeminiResponse = serde_json::from_str(body).unwrap();
        assert!(matches!(
            GeminiProvider::response_text(response),
            Err(LlmError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_unconfigured_provider_fails_without_network() {
        let provider = GeminiProvider::new(DEFAULT_MODEL).with_api_key("");
        let result = provider.complete("test", &GenerationConfig::default()).await;
        assert!(matches!(result, Err(LlmError::NotConfigured(_))));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        let provider = GeminiProvider::new(DEFAULT_MODEL)
            .with_api_key("key")
            .with_endpoint("http://127.0.0.1:1");

        let result = provider.complete("test", &GenerationConfig::default()).await;
        match result {
            Err(LlmError::Communication(_)) => {} // Expected
            other => panic!("Expected Communication error, got {:?}", other),
        }
    }
}
