//! Document format detection from MIME type and file name

use crate::error::ExtractError;
use std::path::Path;

/// Formats the extractor can read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// UTF-8 text
    PlainText,
    /// Portable Document Format
    Pdf,
    /// Word document
    Word,
}

const WORD_MIME_TYPES: &[&str] = &[
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

impl DocumentKind {
    /// Detect the format, trusting the MIME type first and the extension second.
    ///
    /// Browsers often send `application/octet-stream` for Word files, so the
    /// extension is always consulted when the MIME type is not recognised.
    pub fn detect(mime_type: &str, filename: &str) -> Result<Self, ExtractError> {
        let mime = mime_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();

        let by_mime = match mime.as_str() {
            "text/plain" => Some(DocumentKind::PlainText),
            "application/pdf" => Some(DocumentKind::Pdf),
            m if WORD_MIME_TYPES.contains(&m) => Some(DocumentKind::Word),
            _ => None,
        };

        if let Some(kind) = by_mime {
            return Ok(kind);
        }

        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("txt") => Ok(DocumentKind::PlainText),
            Some("pdf") => Ok(DocumentKind::Pdf),
            Some("doc") | Some("docx") => Ok(DocumentKind::Word),
            _ => Err(ExtractError::UnsupportedFileType {
                mime_type: mime_type.to_string(),
                filename: filename.to_string(),
            }),
        }
    }

    /// Short label used in logs and error messages
    pub fn label(&self) -> &'static str {
        match self {
            DocumentKind::PlainText => "text",
            DocumentKind::Pdf => "PDF",
            DocumentKind::Word => "DOCX",
        }
    }
}
