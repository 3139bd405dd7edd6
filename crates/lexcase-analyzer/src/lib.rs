//! LexCase Analyzer
//!
//! Legal document analysis and Q&A on top of a text-completion service.
//!
//! # Overview
//!
//! Each call is a single request/response pass through a fixed pipeline:
//!
//! ```text
//! text/query → PromptBuilder → CompletionProvider → parser → enricher → result
//! ```
//!
//! The parser never fails: output that is not valid JSON turns into a
//! degraded [`AnalysisResult`] with `document_type = "Unknown"` and
//! `confidence = 0.5`. Only validation problems and completion-service
//! failures surface as [`AnalyzerError`].
//!
//! # Example Usage
//!
//! ```no_run
//! use lexcase_analyzer::{AnalysisRequest, AnalyzerConfig, LegalAnalyzer};
//! use lexcase_llm::GeminiProvider;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = Arc::new(GeminiProvider::new("gemini-1.5-flash"));
//! let analyzer = LegalAnalyzer::new(provider, AnalyzerConfig::default());
//!
//! let result = analyzer
//!     .analyze_document(AnalysisRequest::new("This Non-Disclosure Agreement ..."))
//!     .await?;
//!
//! println!("{}: {}", result.document_type, result.summary);
//! println!("Key terms: {:?}", result.key_terms);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod analyzer;
mod config;
mod enricher;
mod error;
mod parser;
mod prompt;
mod types;

#[cfg(test)]
mod tests;

pub use analyzer::LegalAnalyzer;
pub use config::AnalyzerConfig;
pub use enricher::{enrich_analysis, enrich_answer, LEGAL_SOURCES};
pub use error::AnalyzerError;
pub use parser::{parse_analysis, ParsedAnalysis};
pub use prompt::PromptBuilder;
pub use types::{
    AnalysisRequest, AnalysisResult, AssistantQuery, AssistantResponse, DocumentContext,
};
