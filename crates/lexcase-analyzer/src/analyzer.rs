//! The analysis pipeline service

use crate::config::AnalyzerConfig;
use crate::enricher::{enrich_analysis, enrich_answer};
use crate::error::AnalyzerError;
use crate::parser::parse_analysis;
use crate::prompt::PromptBuilder;
use crate::types::{
    AnalysisRequest, AnalysisResult, AssistantQuery, AssistantResponse, DocumentContext,
};
use lexcase_llm::CompletionProvider;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Runs document analysis and assistant queries against a completion provider
///
/// Holds no per-request state; share one instance across all requests.
pub struct LegalAnalyzer {
    provider: Arc<dyn CompletionProvider>,
    config: AnalyzerConfig,
    prompts: PromptBuilder,
}

impl LegalAnalyzer {
    /// Create a new analyzer
    pub fn new(provider: Arc<dyn CompletionProvider>, config: AnalyzerConfig) -> Self {
        let prompts = PromptBuilder::new(
            config.max_prompt_document_chars,
            config.assistant_word_limit,
            config.context_excerpt_chars,
        );
        Self {
            provider,
            config,
            prompts,
        }
    }

    /// Configuration in effect
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Whether the completion service can be called
    pub fn is_available(&self) -> bool {
        self.provider.is_configured()
    }

    /// Model name of the completion service
    pub fn model(&self) -> &str {
        self.provider.model()
    }

    /// Analyze a legal document.
    ///
    /// Fails only on invalid input or a completion-service failure; malformed
    /// model output yields a degraded result instead.
    pub async fn analyze_document(
        &self,
        request: AnalysisRequest,
    ) -> Result<AnalysisResult, AnalyzerError> {
        let text = request
            .document_text
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AnalyzerError::Validation("Document text is required".to_string()))?;

        let document_length = text.chars().count();
        if document_length > self.config.max_document_chars {
            return Err(AnalyzerError::TextTooLong(
                document_length,
                self.config.max_document_chars,
            ));
        }

        self.ensure_available()?;

        info!("Starting document analysis, text length {}", document_length);
        let start = Instant::now();

        let prior_type = request.prior_analysis.as_ref().and_then(prior_document_type);
        let prompt = self.prompts.analysis(text, prior_type);

        debug!("Prompt length: {} chars", prompt.len());

        let raw = self.complete(&prompt).await?;

        debug!("Completion length: {} chars", raw.len());

        let parsed = parse_analysis(&raw, self.config.degraded_summary_chars);
        let degraded = parsed.degraded;
        let result = enrich_analysis(parsed, document_length);

        info!(
            "Analysis complete: type '{}', confidence {:.2}, degraded {}, {} ms",
            result.document_type,
            result.confidence,
            degraded,
            start.elapsed().as_millis()
        );

        Ok(result)
    }

    /// Answer a legal question, optionally about an uploaded document
    pub async fn answer_query(
        &self,
        query: AssistantQuery,
    ) -> Result<AssistantResponse, AnalyzerError> {
        let question = query
            .query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| AnalyzerError::Validation("Query is required".to_string()))?;

        self.ensure_available()?;

        let context = DocumentContext::from_query(&query);

        info!(
            "Answering assistant query ({} chars, document context: {})",
            question.chars().count(),
            !context.is_empty()
        );

        let prompt = self.prompts.assistant(question, &context);
        let answer = self.complete(&prompt).await?;

        if answer.trim().is_empty() {
            warn!("Completion service returned an empty answer");
            return Err(AnalyzerError::Completion(
                "Empty response from AI service".to_string(),
            ));
        }

        Ok(enrich_answer(&answer, &context))
    }

    fn ensure_available(&self) -> Result<(), AnalyzerError> {
        if self.provider.is_configured() {
            Ok(())
        } else {
            Err(AnalyzerError::CompletionUnavailable(format!(
                "completion provider '{}' is not configured",
                self.provider.model()
            )))
        }
    }

    /// Single attempt; errors go straight back to the caller
    async fn complete(&self, prompt: &str) -> Result<String, AnalyzerError> {
        self.provider
            .complete(prompt, &self.config.generation())
            .await
            .map_err(|e| {
                warn!("Completion call failed: {}", e);
                AnalyzerError::from(e)
            })
    }
}

/// Document type from a client-supplied previous analysis, if usable
fn prior_document_type(prior: &Value) -> Option<&str> {
    prior
        .get("document_type")
        .and_then(Value::as_str)
        .filter(|t| !t.trim().is_empty() && *t != crate::parser::UNKNOWN_DOCUMENT_TYPE)
}
