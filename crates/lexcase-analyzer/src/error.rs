//! Error types for the Analyzer

use lexcase_llm::LlmError;
use thiserror::Error;

/// Errors that can occur during analysis or Q&A
///
/// Malformed model output has no variant; the parser absorbs it.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// Required input missing or blank
    #[error("Validation error: {0}")]
    Validation(String),

    /// Document text exceeds the request limit
    #[error("Document too long: {0} chars (max: {1})")]
    TextTooLong(usize, usize),

    /// Completion service not configured or unreachable
    #[error("AI service unavailable: {0}")]
    CompletionUnavailable(String),

    /// Completion service reported an error
    #[error("AI service error: {0}")]
    Completion(String),

    /// The request ran past its deadline
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),
}

impl From<LlmError> for AnalyzerError {
    fn from(e: LlmError) -> Self {
        if e.is_unavailable() {
            AnalyzerError::CompletionUnavailable(e.to_string())
        } else {
            AnalyzerError::Completion(e.to_string())
        }
    }
}
