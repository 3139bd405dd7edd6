//! Configuration for the Analyzer

use lexcase_llm::GenerationConfig;
use serde::{Deserialize, Serialize};

/// Configuration for the Analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Requests with longer document text are rejected (characters)
    pub max_document_chars: usize,

    /// Document text embedded in the prompt is silently cut to this length
    pub max_prompt_document_chars: usize,

    /// Output token cap passed to the completion service
    pub max_output_tokens: u32,

    /// Sampling temperature passed to the completion service
    pub temperature: f32,

    /// Characters of raw model output kept as the summary of a degraded result
    pub degraded_summary_chars: usize,

    /// Word limit the assistant is asked to respect
    pub assistant_word_limit: usize,

    /// Characters of document context quoted in assistant prompts
    pub context_excerpt_chars: usize,
}

impl AnalyzerConfig {
    /// Sampling parameters for completion calls
    pub fn generation(&self) -> GenerationConfig {
        GenerationConfig {
            max_output_tokens: self.max_output_tokens,
            temperature: self.temperature,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_document_chars == 0 {
            return Err("max_document_chars must be greater than 0".to_string());
        }
        if self.max_prompt_document_chars == 0 {
            return Err("max_prompt_document_chars must be greater than 0".to_string());
        }
        if self.max_prompt_document_chars > self.max_document_chars {
            return Err("max_prompt_document_chars cannot exceed max_document_chars".to_string());
        }
        if self.max_output_tokens == 0 {
            return Err("max_output_tokens must be greater than 0".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!("temperature {} out of range [0.0, 2.0]", self.temperature));
        }
        if self.assistant_word_limit == 0 {
            return Err("assistant_word_limit must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str)
            .map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_document_chars: 1_000_000,
            max_prompt_document_chars: 500_000,
            max_output_tokens: 2000,
            temperature: 0.3,
            degraded_summary_chars: 300,
            assistant_word_limit: 300,
            context_excerpt_chars: 2000,
        }
    }
}
