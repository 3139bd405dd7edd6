//! LexCase Server
//!
//! HTTP front end for legal document analysis, the legal assistant and
//! upload text extraction.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;

use config::ServerConfig;
use handlers::{create_router, AppState};
use lexcase_analyzer::LegalAnalyzer;
use lexcase_documents::TextExtractor;
use lexcase_llm::CompletionProvider;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Build the shared application state from configuration
pub fn build_state(config: &ServerConfig) -> AppState {
    let provider = config.completion.provider();
    if !provider.is_configured() {
        warn!(
            "No API key configured (set [completion].api_key or {}); AI endpoints will return 503",
            ServerConfig::api_key_env()
        );
    }

    AppState {
        analyzer: Arc::new(LegalAnalyzer::new(
            Arc::new(provider),
            config.analyzer.clone(),
        )),
        extractor: Arc::new(TextExtractor::new(config.extraction)),
        request_timeout: config.request_timeout(),
    }
}

/// Start the HTTP server
///
/// Builds the completion provider, analyzer and extractor from the
/// configuration and serves until the process is stopped.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    config.validate()?;

    info!("Starting LexCase server");
    info!("Bind address: {}", config.bind_addr());
    info!("Completion model: {}", config.completion.model);
    info!("Request timeout: {} seconds", config.request_timeout_secs);

    let state = build_state(&config);
    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Server listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}
