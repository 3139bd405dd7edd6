//! Configuration file parsing for the server.
//!
//! Loads bind address, request timeout, completion-service settings and the
//! analyzer/extraction limits from a TOML file.

use lexcase_analyzer::AnalyzerConfig;
use lexcase_documents::ExtractionLimits;
use lexcase_llm::gemini::{API_KEY_ENV, DEFAULT_ENDPOINT, DEFAULT_MODEL};
use lexcase_llm::GeminiProvider;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Bind port (e.g., 8080)
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,

    /// Upper bound on a single request, in seconds (default: 300)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Completion service settings
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Analysis pipeline settings
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Upload extraction limits
    #[serde(default)]
    pub extraction: ExtractionLimits,
}

/// Completion service configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Model name (e.g., "gemini-1.5-flash")
    pub model: String,

    /// API root
    pub endpoint: String,

    /// API key; falls back to the `GEMINI_API_KEY` environment variable
    pub api_key: Option<String>,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
        }
    }
}

impl CompletionConfig {
    /// Build the Gemini provider described by this configuration
    pub fn provider(&self) -> GeminiProvider {
        let provider = GeminiProvider::new(&self.model).with_endpoint(&self.endpoint);
        match &self.api_key {
            Some(key) => provider.with_api_key(key),
            None => provider,
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_bind_port() -> u16 {
    8080
}

/// Default request timeout: 5 minutes
fn default_request_timeout() -> u64 {
    300
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.extraction.max_file_bytes == 0
            || self.extraction.max_text_chars == 0
            || self.extraction.max_decompressed_bytes == 0
        {
            return Err(ConfigError::Invalid(
                "extraction limits must be greater than 0".to_string(),
            ));
        }
        self.analyzer.validate().map_err(ConfigError::Invalid)
    }

    /// Create a default configuration for testing
    pub fn default_test_config() -> Self {
        ServerConfig {
            bind_address: default_bind_address(),
            bind_port: default_bind_port(),
            request_timeout_secs: default_request_timeout(),
            completion: CompletionConfig::default(),
            analyzer: AnalyzerConfig::default(),
            extraction: ExtractionLimits::default(),
        }
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }

    /// Request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Name of the environment variable holding the API key
    pub fn api_key_env() -> &'static str {
        API_KEY_ENV
    }
}
