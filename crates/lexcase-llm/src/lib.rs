//! LexCase Completion Layer
//!
//! Pluggable text-completion providers behind a single async trait.
//!
//! # Architecture
//!
//! The analyzer only ever sees [`CompletionProvider`]: it hands over a prompt
//! plus a [`GenerationConfig`] and gets raw text back. Each call is a single
//! attempt; there is no retry or backoff at this layer. Dropping the returned
//! future aborts the in-flight HTTP request.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `GeminiProvider`: Google Generative Language API
//!
//! # Examples
//!
//! ```
//! use lexcase_llm::{CompletionProvider, GenerationConfig, MockProvider};
//!
//! # async fn example() {
//! let provider = MockProvider::new("Hello from LLM!");
//! let result = provider
//!     .complete("test prompt", &GenerationConfig::default())
//!     .await
//!     .unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! # }
//! ```

#![warn(missing_docs)]

pub mod gemini;
pub mod mock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use gemini::GeminiProvider;
pub use mock::MockProvider;

/// Errors that can occur during completion calls
#[derive(Error, Debug)]
pub enum LlmError {
    /// Provider has no credentials or endpoint configured
    #[error("Completion service not configured: {0}")]
    NotConfigured(String),

    /// Network error before the service produced a response
    #[error("Communication error: {0}")]
    Communication(String),

    /// Service answered but reported an error
    #[error("Completion service error: {0}")]
    Service(String),

    /// Service answered with a body we could not use
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl LlmError {
    /// Whether the failure means the service could not be used at all
    /// (as opposed to a call that completed with an error).
    pub fn is_unavailable(&self) -> bool {
        matches!(self, LlmError::NotConfigured(_) | LlmError::Communication(_))
    }
}

/// Sampling parameters sent with every completion call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Upper bound on generated tokens
    pub max_output_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_output_tokens: 2000,
            temperature: 0.3,
        }
    }
}

/// A text-completion backend.
///
/// Implementations must be cheap to share across requests; they hold no
/// per-request state.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Model identifier reported in logs and the health endpoint
    fn model(&self) -> &str;

    /// Whether the provider can be called at all
    fn is_configured(&self) -> bool;

    /// Send `prompt` and return the raw generated text
    async fn complete(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<String, LlmError>;
}
