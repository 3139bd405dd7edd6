//! Error types for text extraction

use thiserror::Error;

/// Errors that can occur while turning an upload into text
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Neither the MIME type nor the file extension is supported
    #[error("Unsupported file type: {mime_type} ({filename})")]
    UnsupportedFileType {
        /// MIME type declared by the client
        mime_type: String,
        /// Original file name
        filename: String,
    },

    /// Upload exceeds the byte limit
    #[error("File too large: {size} bytes (max: {max})")]
    FileTooLarge {
        /// Upload size in bytes
        size: usize,
        /// Configured limit in bytes
        max: usize,
    },

    /// Upload has no content
    #[error("Uploaded file is empty")]
    EmptyFile,

    /// The format library rejected the bytes
    #[error("Failed to read {format} document: {message}")]
    Parse {
        /// Format being parsed ("PDF", "DOCX")
        format: &'static str,
        /// Library error text
        message: String,
    },

    /// The blocking extraction task did not complete
    #[error("Extraction task failed: {0}")]
    Task(String),
}

impl ExtractError {
    pub(crate) fn parse(format: &'static str, message: impl Into<String>) -> Self {
        ExtractError::Parse {
            format,
            message: message.into(),
        }
    }
}
