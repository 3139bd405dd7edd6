//! Deterministic completion provider for tests and local development

use crate::{CompletionProvider, GenerationConfig, LlmError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Mock completion provider
///
/// Returns pre-configured responses without making any network calls.
/// Clones share their call log, so a clone handed to a service can still be
/// inspected from the test.
///
/// # Examples
///
/// ```
/// use lexcase_llm::{CompletionProvider, GenerationConfig, MockProvider};
///
/// # async fn example() {
/// let mut provider = MockProvider::default();
/// provider.add_response("prompt1", "response1");
/// let config = GenerationConfig::default();
/// assert_eq!(provider.complete("prompt1", &config).await.unwrap(), "response1");
/// assert_eq!(provider.call_count(), 1);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<HashMap<String, String>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    configured: bool,
    failure: Option<String>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            configured: true,
            failure: None,
        }
    }

    /// A provider that reports itself as not configured
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::default()
        }
    }

    /// A provider whose every call fails with a service error
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Add a specific response for a given prompt
    pub fn add_response(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .insert(prompt.into(), response.into());
    }

    /// Number of times `complete` was called
    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Prompt passed to the most recent call
    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }

    /// Forget recorded calls
    pub fn reset(&self) {
        self.prompts.lock().unwrap().clear();
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    fn model(&self) -> &str {
        "mock"
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn complete(
        &self,
        prompt: &str,
        _config: &GenerationConfig,
    ) -> Result<String, LlmError> {
        if !self.configured {
            return Err(LlmError::NotConfigured("mock provider disabled".to_string()));
        }

        self.prompts.lock().unwrap().push(prompt.to_string());

        if let Some(message) = &self.failure {
            return Err(LlmError::Service(message.clone()));
        }

        let responses = self.responses.lock().unwrap();
        Ok(responses
            .get(prompt)
            .cloned()
            .unwrap_or_else(|| self.default_response.clone()))
    }
}
