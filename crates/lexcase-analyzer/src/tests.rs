//! Pipeline tests for the Analyzer

#[cfg(test)]
mod tests {
    use crate::{
        AnalysisRequest, AnalyzerConfig, AnalyzerError, AssistantQuery, DocumentContext,
        LegalAnalyzer, PromptBuilder,
    };
    use lexcase_llm::MockProvider;
    use std::sync::Arc;

    fn analyzer_with(provider: &MockProvider) -> LegalAnalyzer {
        LegalAnalyzer::new(Arc::new(provider.clone()), AnalyzerConfig::default())
    }

    #[tokio::test]
    async fn test_oversized_document_truncated_in_prompt_but_length_reported() {
        let provider = MockProvider::new(r#"{"document_type": "Contract"}"#);
        let analyzer = analyzer_with(&provider);

        let text = "ж".repeat(600_000);
        let result = analyzer.analyze_document(AnalysisRequest::new(text)).await.unwrap();

        assert_eq!(result.document_length, 600_000);
        assert_eq!(result.token_count, 150_000);

        let prompt = provider.last_prompt().unwrap();
        let embedded = prompt.matches('ж').count();
        assert_eq!(embedded, 500_000);
    }

    #[tokio::test]
    async fn test_document_length_is_exact_for_multibyte_text() {
        let provider = MockProvider::new("{}");
        let analyzer = analyzer_with(&provider);

        let text = "धारा ".repeat(100);
        let expected = text.chars().count();
        let result = analyzer.analyze_document(AnalysisRequest::new(text)).await.unwrap();

        assert_eq!(result.document_length, expected);
    }

    #[tokio::test]
    async fn test_malformed_output_degrades() {
        let provider = MockProvider::new(r#"{"document_type": "Lease", "summary": "cut off he"#);
        let analyzer = analyzer_with(&provider);

        let result = analyzer
            .analyze_document(AnalysisRequest::new("Lease text"))
            .await
            .unwrap();

        assert_eq!(result.document_type, "Unknown");
        assert_eq!(result.confidence, 0.5);
        assert!(result.summary.starts_with(r#"{"document_type": "Lease""#));
        assert!(result.key_terms.is_empty());
        assert!(result.recommended_actions.is_empty());
        assert_eq!(result.document_length, 10);
    }

    #[tokio::test]
    async fn test_prose_wrapped_fence_output() {
        let provider = MockProvider::new(
            "I'm sorry, I can't process that. ```json\n{\"document_type\": \"NDA\"}\n```",
        );
        let analyzer = analyzer_with(&provider);

        let result = analyzer
            .analyze_document(AnalysisRequest::new("NDA text"))
            .await
            .unwrap();

        assert_eq!(result.document_type, "NDA");
        assert_eq!(result.summary, "");
        assert!(result.parties_involved.is_empty());
        assert!(result.document_structure.is_empty());
    }

    #[tokio::test]
    async fn test_empty_text_short_circuits_completion() {
        let provider = MockProvider::new("{}");
        let analyzer = analyzer_with(&provider);

        let result = analyzer.analyze_document(AnalysisRequest::new("")).await;

        assert!(matches!(result, Err(AnalyzerError::Validation(_))));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unconfigured_provider_is_unavailable() {
        let provider = MockProvider::unconfigured();
        let analyzer = analyzer_with(&provider);
        assert!(!analyzer.is_available());

        let analysis = analyzer.analyze_document(AnalysisRequest::new("text")).await;
        assert!(matches!(analysis, Err(AnalyzerError::CompletionUnavailable(_))));

        let answer = analyzer.answer_query(AssistantQuery::new("question")).await;
        assert!(matches!(answer, Err(AnalyzerError::CompletionUnavailable(_))));
    }

    #[tokio::test]
    async fn test_service_error_is_not_retried() {
        let provider = MockProvider::failing("RESOURCE_EXHAUSTED");
        let analyzer = analyzer_with(&provider);

        let result = analyzer.analyze_document(AnalysisRequest::new("text")).await;

        match result {
            Err(AnalyzerError::Completion(message)) => {
                assert!(message.contains("RESOURCE_EXHAUSTED"));
            }
            other => panic!("Expected Completion error, got {:?}", other),
        }
        assert_eq!(provider.call_count(), 1);
    }

    #[test]
    fn test_analysis_feeds_assistant_context() {
        let provider = MockProvider::new(
            r#"{"document_type": "Leave and Licence Agreement", "key_terms": ["licence fee", "lock-in period"]}"#,
        );
        let analyzer = analyzer_with(&provider);

        let analysis = tokio_test::block_on(
            analyzer.analyze_document(AnalysisRequest::new("This licence is granted...")),
        )
        .unwrap();

        let query = AssistantQuery::new("Can I leave early?").with_document_analysis(&analysis);
        let context = DocumentContext::from_query(&query);
        let prompt = PromptBuilder::new(500_000, 300, 2000).assistant("Can I leave early?", &context);

        assert!(prompt.contains("Leave and Licence Agreement"));
        assert!(prompt.contains("licence fee"));
        assert!(prompt.contains("lock-in period"));
    }

    #[tokio::test]
    async fn test_assistant_after_degraded_analysis_is_general() {
        let provider = MockProvider::new("not json at all");
        let analyzer = analyzer_with(&provider);

        let analysis = analyzer
            .analyze_document(AnalysisRequest::new("Scanned pages"))
            .await
            .unwrap();
        assert_eq!(analysis.document_type, "Unknown");

        let query = AssistantQuery::new("Is this binding?").with_document_analysis(&analysis);
        let response = analyzer.answer_query(query).await.unwrap();

        assert_eq!(response.legal_category, "general");
        assert!(!provider.last_prompt().unwrap().contains("Document type: Unknown"));
    }

    #[tokio::test]
    async fn test_assistant_with_document_analysis() {
        let provider = MockProvider::new("The lock-in period binds both parties.");
        let analyzer = analyzer_with(&provider);

        let query: AssistantQuery = serde_json::from_value(serde_json::json!({
            "query": "Can I leave early?",
            "documentContext": "The Licensee shall not terminate during the lock-in period.",
            "documentAnalysis": {
                "document_type": "Leave and Licence Agreement",
                "key_terms": ["lock-in period"]
            }
        }))
        .unwrap();

        let response = analyzer.answer_query(query).await.unwrap();

        assert_eq!(response.legal_category, "Leave and Licence Agreement");
        assert_eq!(response.related_concepts, vec!["lock-in period"]);
        assert_eq!(response.sources.len(), 5);

        let prompt = provider.last_prompt().unwrap();
        assert!(prompt.contains("shall not terminate during the lock-in period"));
        assert!(prompt.contains("Document type: Leave and Licence Agreement"));
    }
}

#[cfg(test)]
mod proptests {
    use crate::{AnalysisRequest, AnalyzerConfig, LegalAnalyzer};
    use lexcase_llm::MockProvider;
    use proptest::prelude::*;
    use std::sync::Arc;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Property: document_length is the exact input length, even past the prompt limit
        #[test]
        fn test_document_length_matches_input(text in "\\PC{1,3000}", limit in 1usize..2000) {
            prop_assume!(!text.trim().is_empty());

            let provider = MockProvider::new(r#"{"document_type": "Contract"}"#);
            let config = AnalyzerConfig {
                max_prompt_document_chars: limit,
                ..AnalyzerConfig::default()
            };
            let analyzer = LegalAnalyzer::new(Arc::new(provider), config);

            let result = tokio_test::block_on(analyzer.analyze_document(AnalysisRequest::new(text.clone())))
                .unwrap();

            let expected = text.chars().count();
            prop_assert_eq!(result.document_length, expected);
            prop_assert_eq!(result.token_count, expected / 4);
        }
    }
}

