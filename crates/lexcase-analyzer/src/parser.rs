//! Parse model output into an analysis candidate
//!
//! Parsing never fails. Output that cannot be read as a JSON object becomes
//! a degraded candidate; fields missing from an object get zero values.

use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Confidence used when the model omits one
pub(crate) const DEFAULT_CONFIDENCE: f64 = 0.85;

/// Confidence of a degraded result
pub(crate) const DEGRADED_CONFIDENCE: f64 = 0.5;

/// Document type of a degraded result
pub(crate) const UNKNOWN_DOCUMENT_TYPE: &str = "Unknown";

/// Analysis fields read from model output, every field populated
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedAnalysis {
    /// Detected document type
    pub document_type: String,
    /// Summary text
    pub summary: String,
    /// Key terms
    pub key_terms: Vec<String>,
    /// Parties
    pub parties_involved: Vec<String>,
    /// Dates
    pub key_dates: Vec<String>,
    /// Monetary values
    pub monetary_values: Vec<String>,
    /// Legal provisions
    pub legal_provisions: Vec<String>,
    /// Risks
    pub risk_assessment: Vec<String>,
    /// Next steps
    pub recommended_actions: Vec<String>,
    /// Structure object, empty when absent
    pub document_structure: Map<String, Value>,
    /// Confidence in [0, 1]
    pub confidence: f64,
    /// True when the output could not be parsed as JSON
    pub degraded: bool,
}

impl ParsedAnalysis {
    /// Placeholder built from unparseable output
    fn degraded(raw: &str, summary_chars: usize) -> Self {
        Self {
            document_type: UNKNOWN_DOCUMENT_TYPE.to_string(),
            summary: raw.chars().take(summary_chars).collect(),
            key_terms: Vec::new(),
            parties_involved: Vec::new(),
            key_dates: Vec::new(),
            monetary_values: Vec::new(),
            legal_provisions: Vec::new(),
            risk_assessment: Vec::new(),
            recommended_actions: Vec::new(),
            document_structure: Map::new(),
            confidence: DEGRADED_CONFIDENCE,
            degraded: true,
        }
    }

    fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            document_type: string_field(obj, "document_type"),
            summary: string_field(obj, "summary"),
            key_terms: list_field(obj, "key_terms"),
            parties_involved: list_field(obj, "parties_involved"),
            key_dates: list_field(obj, "key_dates"),
            monetary_values: list_field(obj, "monetary_values"),
            legal_provisions: list_field(obj, "legal_provisions"),
            risk_assessment: list_field(obj, "risk_assessment"),
            recommended_actions: list_field(obj, "recommended_actions"),
            document_structure: obj
                .get("document_structure")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
            confidence: confidence_field(obj),
            degraded: false,
        }
    }
}

/// Parse raw completion text into an analysis candidate
///
/// The trimmed text is tried as JSON first; fence bodies are only consulted
/// when that fails. `summary_chars` bounds the summary of a degraded
/// candidate.
pub fn parse_analysis(raw: &str, summary_chars: usize) -> ParsedAnalysis {
    let trimmed = raw.trim();
    let mut failure = String::from("empty output");

    for candidate in json_candidates(trimmed) {
        match serde_json::from_str::<Value>(candidate) {
            Ok(Value::Object(obj)) => {
                debug!("Parsed analysis object with {} fields", obj.len());
                return ParsedAnalysis::from_object(&obj);
            }
            Ok(other) => failure = format!("JSON {} instead of an object", json_kind(&other)),
            Err(e) => failure = e.to_string(),
        }
    }

    warn!("Model output is not a JSON object ({}); returning degraded result", failure);
    ParsedAnalysis::degraded(trimmed, summary_chars)
}

/// Texts worth handing to the JSON parser, most likely first.
///
/// The whole text comes first. When a ``` fence is present, its body follows:
/// up to the last closing fence, then up to the next closing fence, then
/// everything after the opening marker (output cut at the token cap). Text
/// before the opening fence is always dropped.
fn json_candidates(text: &str) -> Vec<&str> {
    let mut candidates = vec![text];

    let Some(start) = text.find(FENCE) else {
        return candidates;
    };

    let mut body = &text[start + FENCE.len()..];
    if body.get(..4).is_some_and(|tag| tag.eq_ignore_ascii_case("json")) {
        body = &body[4..];
    }

    if let (Some(first), Some(last)) = (body.find(FENCE), body.rfind(FENCE)) {
        candidates.push(body[..last].trim());
        if first != last {
            candidates.push(body[..first].trim());
        }
    }
    candidates.push(body.trim());

    candidates
}

const FENCE: &str = "```";

fn string_field(obj: &Map<String, Value>, key: &str) -> String {
    match obj.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Read a list of strings, tolerating the shapes models actually produce
fn list_field(obj: &Map<String, Value>, key: &str) -> Vec<String> {
    match obj.get(key) {
        Some(Value::Array(items)) => items.iter().filter_map(item_to_string).collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

fn item_to_string(item: &Value) -> Option<String> {
    match item {
        Value::Null => None,
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

fn confidence_field(obj: &Map<String, Value>) -> f64 {
    let value = match obj.get("confidence") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match value {
        Some(c) if c.is_finite() => c.clamp(0.0, 1.0),
        _ => DEFAULT_CONFIDENCE,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    const LIST_FIELDS: [&str; 7] = [
        "key_terms",
        "parties_involved",
        "key_dates",
        "monetary_values",
        "legal_provisions",
        "risk_assessment",
        "recommended_actions",
    ];

    /// Arbitrary JSON values, nested a few levels deep
    fn json_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            (-1.0e6f64..1.0e6).prop_map(Value::from),
            ".*".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 32, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::btree_map("[a-z_]{1,12}", inner, 0..6)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    /// Objects shaped like analysis output, with any value in any field
    fn analysis_object() -> impl Strategy<Value = Map<String, Value>> {
        let field = prop_oneof![
            Just("document_type".to_string()),
            Just("summary".to_string()),
            Just("document_structure".to_string()),
            Just("confidence".to_string()),
            prop::sample::select(LIST_FIELDS.to_vec()).prop_map(|f: &str| f.to_string()),
            "[a-z_]{1,12}",
        ];
        prop::collection::btree_map(field, json_value(), 0..12)
            .prop_map(|m| m.into_iter().collect())
    }

    fn assert_well_formed(parsed: &ParsedAnalysis) -> Result<(), TestCaseError> {
        prop_assert!((0.0..=1.0).contains(&parsed.confidence));
        for list in [
            &parsed.key_terms,
            &parsed.parties_involved,
            &parsed.key_dates,
            &parsed.monetary_values,
            &parsed.legal_provisions,
            &parsed.risk_assessment,
            &parsed.recommended_actions,
        ] {
            prop_assert!(list.iter().all(|item| !item.is_empty()));
        }
        Ok(())
    }

    proptest! {
        /// Property: any output parses without panicking into a well-formed candidate
        #[test]
        fn test_any_output_is_well_formed(raw in ".*") {
            let parsed = parse_analysis(&raw, 300);
            assert_well_formed(&parsed)?;

            if parsed.degraded {
                prop_assert_eq!(parsed.document_type.as_str(), UNKNOWN_DOCUMENT_TYPE);
                prop_assert_eq!(parsed.confidence, DEGRADED_CONFIDENCE);
                prop_assert!(parsed.key_terms.is_empty() && parsed.recommended_actions.is_empty());
                prop_assert!(parsed.document_structure.is_empty());
                prop_assert!(parsed.summary.chars().count() <= 300);
            }
        }

        /// Property: prose that is not JSON always degrades with its own prefix as summary
        #[test]
        fn test_prose_always_degrades(raw in "[a-zA-Z][^`]{0,600}") {
            let parsed = parse_analysis(&raw, 300);
            let expected: String = raw.trim().chars().take(300).collect();

            prop_assert!(parsed.degraded);
            prop_assert_eq!(parsed.confidence, 0.5);
            prop_assert_eq!(parsed.summary, expected);
        }

        /// Property: wrapping an object in a code fence does not change the result
        #[test]
        fn test_fence_wrapping_is_transparent(
            obj in analysis_object(),
            tag in prop::sample::select(vec!["json", "JSON", ""]),
            prose in "[a-zA-Z ,.']{0,40}",
        ) {
            let json = serde_json::to_string_pretty(&Value::Object(obj)).unwrap();
            let unfenced = parse_analysis(&json, 300);
            prop_assert!(!unfenced.degraded);

            let fenced = format!("{}```{}\n{}\n```", prose, tag, json);
            prop_assert_eq!(parse_analysis(&fenced, 300), unfenced);
        }

        /// Property: every field is populated whatever types the model used
        #[test]
        fn test_object_fields_always_populated(obj in analysis_object()) {
            let json = serde_json::to_string(&Value::Object(obj)).unwrap();
            let parsed = parse_analysis(&json, 300);

            prop_assert!(!parsed.degraded);
            assert_well_formed(&parsed)?;
        }
    }
}
