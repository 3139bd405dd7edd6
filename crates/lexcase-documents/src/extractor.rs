//! Upload-to-text extraction with size bounds

use crate::error::ExtractError;
use crate::kind::DocumentKind;
use crate::{docx, pdf};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Size bounds applied to every extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionLimits {
    /// Uploads larger than this are rejected before parsing
    pub max_file_bytes: usize,

    /// Extracted text is cut to this many characters
    pub max_text_chars: usize,

    /// Upper bound on a compressed document part once inflated
    pub max_decompressed_bytes: usize,
}

impl Default for ExtractionLimits {
    fn default() -> Self {
        Self {
            max_file_bytes: 5 * 1024 * 1024,
            max_text_chars: 100_000,
            max_decompressed_bytes: 32 * 1024 * 1024,
        }
    }
}

/// An uploaded file as received from the client
#[derive(Debug, Clone)]
pub struct Upload {
    /// Raw file content
    pub bytes: Vec<u8>,
    /// Declared MIME type (may be empty)
    pub mime_type: String,
    /// Original file name (may be empty)
    pub filename: String,
}

impl Upload {
    /// Create an upload
    pub fn new(
        bytes: impl Into<Vec<u8>>,
        mime_type: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
            filename: filename.into(),
        }
    }
}

/// Text pulled out of an upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    /// Normalized text, at most `max_text_chars` characters
    pub text: String,
    /// Detected format
    pub kind: DocumentKind,
    /// Whether the text was cut to the character limit
    pub truncated: bool,
}

/// Converts uploads to text
#[derive(Debug, Clone, Default)]
pub struct TextExtractor {
    limits: ExtractionLimits,
}

impl TextExtractor {
    /// Create an extractor with the given limits
    pub fn new(limits: ExtractionLimits) -> Self {
        Self { limits }
    }

    /// Limits in effect
    pub fn limits(&self) -> &ExtractionLimits {
        &self.limits
    }

    /// Extract text on the blocking thread pool.
    ///
    /// Format detection and the size check run before the task is spawned,
    /// so rejected uploads never reach a parser.
    pub async fn extract(&self, upload: Upload) -> Result<ExtractedText, ExtractError> {
        let kind = self.check(&upload)?;
        let limits = self.limits;

        tokio::task::spawn_blocking(move || run(kind, upload, &limits))
            .await
            .map_err(|e| ExtractError::Task(e.to_string()))?
    }

    /// Extract text on the current thread
    pub fn extract_blocking(&self, upload: Upload) -> Result<ExtractedText, ExtractError> {
        let kind = self.check(&upload)?;
        run(kind, upload, &self.limits)
    }

    fn check(&self, upload: &Upload) -> Result<DocumentKind, ExtractError> {
        if upload.bytes.is_empty() {
            return Err(ExtractError::EmptyFile);
        }
        if upload.bytes.len() > self.limits.max_file_bytes {
            warn!(
                "Rejecting upload '{}' of {} bytes (max {})",
                upload.filename,
                upload.bytes.len(),
                self.limits.max_file_bytes
            );
            return Err(ExtractError::FileTooLarge {
                size: upload.bytes.len(),
                max: self.limits.max_file_bytes,
            });
        }
        DocumentKind::detect(&upload.mime_type, &upload.filename)
    }
}

fn run(
    kind: DocumentKind,
    upload: Upload,
    limits: &ExtractionLimits,
) -> Result<ExtractedText, ExtractError> {
    let Upload { bytes, filename, .. } = upload;

    info!(
        "Extracting {} text from '{}' ({} bytes)",
        kind.label(),
        filename,
        bytes.len()
    );

    let raw = match kind {
        DocumentKind::PlainText => String::from_utf8_lossy(&bytes).into_owned(),
        DocumentKind::Pdf => pdf::extract_text(&bytes)?,
        DocumentKind::Word => docx::extract_text(&bytes, limits.max_decompressed_bytes)?,
    };

    // The upload buffer can be several megabytes; release it before
    // normalizing rather than at the end of the request.
    drop(bytes);

    let normalized = normalize(&raw);
    drop(raw);

    let (text, truncated) = truncate_chars(normalized, limits.max_text_chars);
    if truncated {
        warn!(
            "Extracted text from '{}' truncated to {} characters",
            filename, limits.max_text_chars
        );
    }

    debug!("Extracted {} characters from '{}'", text.chars().count(), filename);

    Ok(ExtractedText {
        text,
        kind,
        truncated,
    })
}

/// Unify line endings, drop NULs and other control noise, trim the ends
fn normalize(raw: &str) -> String {
    let unified = raw.replace("\r\n", "\n").replace('\r', "\n");
    let cleaned: String = unified
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\t'))
        .collect();
    cleaned.trim().to_string()
}

/// Cut `text` to at most `max` characters on a char boundary
fn truncate_chars(mut text: String, max: usize) -> (String, bool) {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => {
            text.truncate(byte_idx);
            (text, true)
        }
        None => (text, false),
    }
}
