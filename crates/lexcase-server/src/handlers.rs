//! HTTP request handlers for the analysis service.
//!
//! Implements document analysis, the legal assistant, upload text extraction
//! and a health check using axum. Every JSON response uses the
//! `{ success, data | text, message }` envelope.

use axum::{
    extract::{
        rejection::JsonRejection,
        multipart::{MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use lexcase_analyzer::{
    AnalysisRequest, AnalysisResult, AnalyzerError, AssistantQuery, AssistantResponse,
    LegalAnalyzer,
};
use lexcase_documents::{ExtractError, ExtractionLimits, TextExtractor, Upload};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

/// Headroom for JSON syntax and multipart framing on top of the payload limits
const BODY_OVERHEAD_BYTES: usize = 64 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Analysis pipeline
    pub analyzer: Arc<LegalAnalyzer>,
    /// Upload text extractor
    pub extractor: Arc<TextExtractor>,
    /// Deadline for a whole pipeline run
    pub request_timeout: Duration,
}

/// Response envelope for the AI endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request succeeded
    pub success: bool,
    /// Payload on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error description on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }
}

/// Response for upload text extraction
#[derive(Debug, Serialize, Deserialize)]
pub struct ExtractTextResponse {
    /// Whether the request succeeded
    pub success: bool,
    /// Extracted text on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Error description on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// "healthy", or "degraded" when the completion service is not configured
    pub status: String,
    /// Whether AI endpoints can serve requests
    pub completion_configured: bool,
    /// Completion model name
    pub model: String,
}

/// Error response body
#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    message: String,
}

/// Application error type
#[derive(Debug)]
pub enum ApiError {
    /// Pipeline error
    Analyzer(AnalyzerError),
    /// Upload extraction error
    Extraction(ExtractError),
    /// Malformed request
    BadRequest(String),
    /// Request body over the size limit
    PayloadTooLarge(String),
}

impl ApiError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Analyzer(e) => match e {
                AnalyzerError::Validation(_) => StatusCode::BAD_REQUEST,
                AnalyzerError::TextTooLong(_, _) => StatusCode::PAYLOAD_TOO_LARGE,
                AnalyzerError::CompletionUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                AnalyzerError::Completion(_) => StatusCode::INTERNAL_SERVER_ERROR,
                AnalyzerError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            },
            ApiError::Extraction(e) => match e {
                ExtractError::UnsupportedFileType { .. }
                | ExtractError::FileTooLarge { .. }
                | ExtractError::EmptyFile => StatusCode::BAD_REQUEST,
                ExtractError::Parse { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                ExtractError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Analyzer(e) => e.to_string(),
            ApiError::Extraction(e) => e.to_string(),
            ApiError::BadRequest(msg) | ApiError::PayloadTooLarge(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();

        if status.is_server_error() {
            warn!("Request failed with {}: {}", status, message);
        } else {
            info!("Request rejected with {}: {}", status, message);
        }

        let body = Json(ErrorResponse {
            success: false,
            message,
        });
        (status, body).into_response()
    }
}

impl From<AnalyzerError> for ApiError {
    fn from(e: AnalyzerError) -> Self {
        ApiError::Analyzer(e)
    }
}

impl From<ExtractError> for ApiError {
    fn from(e: ExtractError) -> Self {
        ApiError::Extraction(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge("Request body too large".to_string())
        } else {
            ApiError::BadRequest(rejection.body_text())
        }
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Run a pipeline future under the request deadline.
///
/// On timeout the future is dropped, which aborts the in-flight completion
/// call. The same happens when the client disconnects.
async fn with_deadline<T, F>(timeout: Duration, fut: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, AnalyzerError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result.map_err(ApiError::from),
        Err(_) => Err(AnalyzerError::Timeout(timeout.as_secs()).into()),
    }
}

/// POST /analyze-document - Analyze a legal document
async fn analyze_document(
    State(state): State<AppState>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<AnalysisResult>>, ApiError> {
    let Json(request) = payload?;
    let result = with_deadline(state.request_timeout, state.analyzer.analyze_document(request)).await?;
    Ok(Json(ApiResponse::ok(result)))
}

/// POST /legal-assistant - Answer a legal question
async fn legal_assistant(
    State(state): State<AppState>,
    payload: Result<Json<AssistantQuery>, JsonRejection>,
) -> Result<Json<ApiResponse<AssistantResponse>>, ApiError> {
    let Json(query) = payload?;
    let response = with_deadline(state.request_timeout, state.analyzer.answer_query(query)).await?;
    Ok(Json(ApiResponse::ok(response)))
}

/// POST /account/extract-text - Extract text from an uploaded file
///
/// Reads the first multipart field that carries a file name.
async fn extract_text(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ExtractTextResponse>, ApiError> {
    let mut multipart = multipart?;

    let limits = *state.extractor.limits();
    let body_error = |e: MultipartError| multipart_error(e, &limits);

    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(body_error)? {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let mime_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(body_error)?;
        upload = Some(Upload::new(bytes.to_vec(), mime_type, filename));
        break;
    }

    let upload = upload.ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))?;
    let extracted = state.extractor.extract(upload).await?;

    Ok(Json(ExtractTextResponse {
        success: true,
        text: Some(extracted.text),
        message: None,
    }))
}

/// Body limit for the upload route, sized above the extractor limit
fn upload_body_limit(limits: &ExtractionLimits) -> usize {
    limits.max_file_bytes * 2 + BODY_OVERHEAD_BYTES
}

/// Map a multipart read failure; a body over the route limit is a file
/// size problem, not a malformed request.
fn multipart_error(e: MultipartError, limits: &ExtractionLimits) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::BadRequest(format!(
            "File too large: upload exceeds {} bytes (max: {})",
            upload_body_limit(limits),
            limits.max_file_bytes
        ))
    } else {
        ApiError::BadRequest(e.body_text())
    }
}

/// GET /health - Service health
async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    let configured = state.analyzer.is_available();

    Json(HealthCheckResponse {
        status: if configured { "healthy" } else { "degraded" }.to_string(),
        completion_configured: configured,
        model: state.analyzer.model().to_string(),
    })
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> AxumRouter {
    // Multi-byte text can take up to four bytes per character.
    let json_limit = state.analyzer.config().max_document_chars * 4 + BODY_OVERHEAD_BYTES;
    // Oversized files should reach the extractor so the exact size is reported.
    let upload_limit = upload_body_limit(state.extractor.limits());

    AxumRouter::new()
        .route(
            "/analyze-document",
            post(analyze_document).layer(DefaultBodyLimit::max(json_limit)),
        )
        .route(
            "/legal-assistant",
            post(legal_assistant).layer(DefaultBodyLimit::max(json_limit)),
        )
        .route(
            "/account/extract-text",
            post(extract_text).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/health", get(health_check))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
