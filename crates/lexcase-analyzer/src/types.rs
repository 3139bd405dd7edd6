//! Request and response types for analysis and Q&A

use crate::parser::UNKNOWN_DOCUMENT_TYPE;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Request to analyze a document
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    /// Full document text
    #[serde(default)]
    pub document_text: Option<String>,

    /// Earlier analysis of the same document, if the client has one
    #[serde(default)]
    pub prior_analysis: Option<Value>,
}

impl AnalysisRequest {
    /// Request for `text` without prior analysis
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            document_text: Some(text.into()),
            prior_analysis: None,
        }
    }
}

/// Structured analysis of a legal document
///
/// Every list is always present (possibly empty) so consumers never need a
/// null check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Length of the submitted text in characters, before any truncation
    pub document_length: usize,
    /// `document_length / 4`
    pub token_count: usize,
    /// Detected document type, "Unknown" on the degraded path
    pub document_type: String,
    /// Plain-language summary
    pub summary: String,
    /// Important defined terms and clauses
    pub key_terms: Vec<String>,
    /// Named parties
    pub parties_involved: Vec<String>,
    /// Dates with legal significance
    pub key_dates: Vec<String>,
    /// Amounts, fees and penalties
    pub monetary_values: Vec<String>,
    /// Statutes and provisions referenced
    pub legal_provisions: Vec<String>,
    /// Identified risks
    pub risk_assessment: Vec<String>,
    /// Suggested next steps
    pub recommended_actions: Vec<String>,
    /// Free-form outline returned by the model; `{}` when absent
    pub document_structure: Map<String, Value>,
    /// Model confidence in [0, 1]
    pub confidence: f64,
}

/// Question for the legal assistant
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantQuery {
    /// The user's question
    #[serde(default)]
    pub query: Option<String>,

    /// Text of a document the user is asking about
    #[serde(default)]
    pub document_context: Option<String>,

    /// Analysis previously returned for that document
    #[serde(default)]
    pub document_analysis: Option<Value>,
}

impl AssistantQuery {
    /// Query without document context
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Self::default()
        }
    }

    /// Attach document text
    pub fn with_document_context(mut self, context: impl Into<String>) -> Self {
        self.document_context = Some(context.into());
        self
    }

    /// Attach a previous analysis
    pub fn with_document_analysis(mut self, analysis: &AnalysisResult) -> Self {
        self.document_analysis = serde_json::to_value(analysis).ok();
        self
    }
}

/// Answer from the legal assistant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantResponse {
    /// Answer text
    pub response: String,
    /// Confidence in [0, 1]
    pub confidence: f64,
    /// Area of law, or "general"
    pub legal_category: String,
    /// Concepts related to the answer
    pub related_concepts: Vec<String>,
    /// Reference list shown alongside the answer
    pub sources: Vec<String>,
}

/// What the assistant knows about the document a question refers to
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentContext {
    /// Raw document text
    pub text: Option<String>,
    /// Type from a previous analysis
    pub document_type: Option<String>,
    /// Key terms from a previous analysis
    pub key_terms: Vec<String>,
}

impl DocumentContext {
    /// Collect context from an assistant query.
    ///
    /// `documentAnalysis` is client-supplied JSON, so fields are read
    /// leniently: wrong types and blank values are ignored. The placeholder
    /// type of a degraded analysis is not a document type.
    pub fn from_query(query: &AssistantQuery) -> Self {
        let text = query
            .document_context
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        let analysis = query.document_analysis.as_ref().and_then(Value::as_object);

        let document_type = analysis
            .and_then(|a| a.get("document_type"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty() && *t != UNKNOWN_DOCUMENT_TYPE)
            .map(str::to_string);

        let key_terms = analysis
            .and_then(|a| a.get("key_terms"))
            .and_then(Value::as_array)
            .map(|terms| {
                terms
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            text,
            document_type,
            key_terms,
        }
    }

    /// Whether there is anything to tell the model about
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.document_type.is_none() && self.key_terms.is_empty()
    }
}
