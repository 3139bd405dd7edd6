//! Prompt construction for document analysis and the legal assistant

use crate::types::DocumentContext;
use tracing::warn;

/// Builds prompts for the completion service
///
/// Building is infallible; optional inputs that are absent are left out of
/// the prompt.
pub struct PromptBuilder {
    max_document_chars: usize,
    word_limit: usize,
    excerpt_chars: usize,
}

impl PromptBuilder {
    /// Create a new prompt builder
    ///
    /// - `max_document_chars`: document text beyond this is cut before embedding
    /// - `word_limit`: length the assistant is asked to stay under
    /// - `excerpt_chars`: how much document context to quote in assistant prompts
    pub fn new(max_document_chars: usize, word_limit: usize, excerpt_chars: usize) -> Self {
        Self {
            max_document_chars,
            word_limit,
            excerpt_chars,
        }
    }

    /// Build the document-analysis prompt
    ///
    /// `prior_type` is the document type from an earlier analysis, if any.
    pub fn analysis(&self, text: &str, prior_type: Option<&str>) -> String {
        let (document, truncated) = truncate_chars(text, self.max_document_chars);
        if truncated {
            warn!(
                "Document truncated from {} to {} characters for analysis",
                text.chars().count(),
                self.max_document_chars
            );
        }

        let mut prompt = String::with_capacity(document.len() + 2048);

        prompt.push_str(ANALYSIS_INSTRUCTIONS);
        prompt.push_str("\n\n");

        if let Some(prior) = prior_type.map(str::trim).filter(|p| !p.is_empty()) {
            prompt.push_str(&format!(
                "A previous analysis classified this document as \"{}\". Confirm or correct this classification.\n\n",
                prior
            ));
        }

        prompt.push_str("Document to analyze:\n");
        prompt.push_str("---\n");
        prompt.push_str(document);
        prompt.push_str("\n---\n\n");

        prompt.push_str(ANALYSIS_OUTPUT_FORMAT);

        prompt
    }

    /// Build the legal-assistant prompt
    pub fn assistant(&self, query: &str, context: &DocumentContext) -> String {
        let mut prompt = String::new();

        prompt.push_str(ASSISTANT_INSTRUCTIONS);
        prompt.push_str("\n\n");

        prompt.push_str("Question:\n");
        prompt.push_str(query.trim());
        prompt.push_str("\n\n");

        if !context.is_empty() {
            prompt.push_str("The user has uploaded a document.\n");
            if let Some(document_type) = &context.document_type {
                prompt.push_str(&format!("Document type: {}\n", document_type));
            }
            if !context.key_terms.is_empty() {
                prompt.push_str(&format!("Key terms: {}\n", context.key_terms.join(", ")));
            }
            if let Some(text) = &context.text {
                let (excerpt, truncated) = truncate_chars(text, self.excerpt_chars);
                prompt.push_str("Document excerpt:\n---\n");
                prompt.push_str(excerpt);
                if truncated {
                    prompt.push_str("\n[...]");
                }
                prompt.push_str("\n---\n");
            }
            prompt.push_str("Refer to this document in your answer when it is relevant to the question.\n\n");
        }

        prompt.push_str(&format!(
            "Keep your answer under {} words. Respond in plain text without markdown formatting.",
            self.word_limit
        ));

        prompt
    }
}

/// Borrow at most `max` characters of `text`
pub(crate) fn truncate_chars(text: &str, max: usize) -> (&str, bool) {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => (&text[..byte_idx], true),
        None => (text, false),
    }
}

const ANALYSIS_INSTRUCTIONS: &str = r#"You are a legal document analyst. Analyze the following legal document and extract its key information.

Rules:
- Identify the type of document (e.g., "Non-Disclosure Agreement", "Lease Agreement", "Employment Contract")
- Summarize the document in plain language in a few sentences
- List the parties involved with their roles
- List dates with legal significance (execution, commencement, termination, deadlines)
- List monetary values with what they pay for (fees, deposits, penalties)
- List statutes, acts and sections referenced or clearly applicable
- Assess risks for the parties, most serious first
- Recommend concrete next steps
- Set confidence between 0.0 and 1.0 to reflect how certain the analysis is"#;

const ANALYSIS_OUTPUT_FORMAT: &str = r#"Output format (a single JSON object):
{
  "document_type": "string",
  "summary": "string",
  "key_terms": ["string"],
  "parties_involved": ["string"],
  "key_dates": ["string"],
  "monetary_values": ["string"],
  "legal_provisions": ["string"],
  "risk_assessment": ["string"],
  "recommended_actions": ["string"],
  "document_structure": {"sections": ["string"]},
  "confidence": 0.0-1.0
}

Return ONLY valid JSON, no markdown or extra text."#;

const ASSISTANT_INSTRUCTIONS: &str = r#"You are a legal education assistant helping law students and members of the public understand legal concepts.
Answer the question accurately and clearly. Explain legal terms when you use them, cite relevant statutes or cases where appropriate, and note when a qualified lawyer should be consulted."#;
