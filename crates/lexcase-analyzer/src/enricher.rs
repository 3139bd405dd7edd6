//! Final response assembly: parsed fields plus static metadata

use crate::parser::ParsedAnalysis;
use crate::types::{AnalysisResult, AssistantResponse, DocumentContext};

/// Reference list attached to every assistant answer.
///
/// This is a fixed disclosure list and does not depend on the answer.
pub const LEGAL_SOURCES: [&str; 5] = [
    "LexCase Legal Knowledge Base",
    "Indian Contract Act, 1872",
    "Indian Penal Code, 1860",
    "Code of Civil Procedure, 1908",
    "Constitution of India",
];

/// Confidence reported with assistant answers
pub(crate) const ASSISTANT_CONFIDENCE: f64 = 0.85;

/// Category used when no document type is known
pub(crate) const GENERAL_CATEGORY: &str = "general";

/// Characters per token in the token estimate
const CHARS_PER_TOKEN: usize = 4;

/// Build the final analysis from a parsed candidate.
///
/// `document_length` is the length of the text as submitted, before the
/// prompt builder truncated it.
pub fn enrich_analysis(parsed: ParsedAnalysis, document_length: usize) -> AnalysisResult {
    AnalysisResult {
        document_length,
        token_count: document_length / CHARS_PER_TOKEN,
        document_type: parsed.document_type,
        summary: parsed.summary,
        key_terms: parsed.key_terms,
        parties_involved: parsed.parties_involved,
        key_dates: parsed.key_dates,
        monetary_values: parsed.monetary_values,
        legal_provisions: parsed.legal_provisions,
        risk_assessment: parsed.risk_assessment,
        recommended_actions: parsed.recommended_actions,
        document_structure: parsed.document_structure,
        confidence: parsed.confidence.clamp(0.0, 1.0),
    }
}

/// Build the assistant response around the model's answer
pub fn enrich_answer(answer: &str, context: &DocumentContext) -> AssistantResponse {
    AssistantResponse {
        response: answer.trim().to_string(),
        confidence: ASSISTANT_CONFIDENCE,
        legal_category: context
            .document_type
            .clone()
            .unwrap_or_else(|| GENERAL_CATEGORY.to_string()),
        related_concepts: context.key_terms.clone(),
        sources: LEGAL_SOURCES.iter().map(|s| s.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_analysis;

    #[test]
    fn test_token_count_heuristic() {
        let parsed = parse_analysis(r#"{"document_type": "NDA"}"#, 300);
        assert_eq!(enrich_analysis(parsed.clone(), 0).token_count, 0);
        assert_eq!(enrich_analysis(parsed.clone(), 3).token_count, 0);
        assert_eq!(enrich_analysis(parsed.clone(), 7).token_count, 1);
        assert_eq!(enrich_analysis(parsed, 600_000).token_count, 150_000);
    }

    #[test]
    fn test_fields_copied_through() {
        let parsed = parse_analysis(
            r#"{"document_type": "Lease", "key_terms": ["rent"], "confidence": 0.6}"#,
            300,
        );
        let result = enrich_analysis(parsed, 1234);

        assert_eq!(result.document_length, 1234);
        assert_eq!(result.document_type, "Lease");
        assert_eq!(result.key_terms, vec!["rent"]);
        assert!(result.parties_involved.is_empty());
        assert!(result.document_structure.is_empty());
        assert!((result.confidence - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn test_degraded_result_serializes_empty_arrays() {
        let result = enrich_analysis(parse_analysis("not json", 300), 8);
        let json = serde_json::to_value(&result).unwrap();

        for field in [
            "key_terms",
            "parties_involved",
            "key_dates",
            "monetary_values",
            "legal_provisions",
            "risk_assessment",
            "recommended_actions",
        ] {
            assert_eq!(json[field], serde_json::json!([]), "{} should be []", field);
        }
        assert_eq!(json["document_structure"], serde_json::json!({}));
        assert_eq!(json["document_type"], "Unknown");
        assert_eq!(json["confidence"], 0.5);
    }

    #[test]
    fn test_answer_without_context() {
        let response = enrich_answer("  Consideration is something of value.  ", &DocumentContext::default());
        assert_eq!(response.response, "Consideration is something of value.");
        assert_eq!(response.legal_category, "general");
        assert!(response.related_concepts.is_empty());
        assert_eq!(response.sources.len(), 5);
        assert_eq!(response.sources[0], "LexCase Legal Knowledge Base");
        assert_eq!(response.confidence, ASSISTANT_CONFIDENCE);
    }

    #[test]
    fn test_answer_uses_document_context() {
        let context = DocumentContext {
            text: None,
            document_type: Some("Sale Deed".to_string()),
            key_terms: vec!["stamp duty".to_string()],
        };
        let response = enrich_answer("Yes.", &context);
        assert_eq!(response.legal_category, "Sale Deed");
        assert_eq!(response.related_concepts, vec!["stamp duty"]);
    }

    #[test]
    fn test_sources_do_not_depend_on_answer() {
        let a = enrich_answer("About torts", &DocumentContext::default());
        let b = enrich_answer("About contracts", &DocumentContext::default());
        assert_eq!(a.sources, b.sources);
    }
}
