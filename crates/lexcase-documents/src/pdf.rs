//! PDF text extraction

use crate::error::ExtractError;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Extract the text layer of a PDF held in memory.
///
/// `pdf-extract` panics on some malformed files; the panic is contained and
/// reported as a parse error.
pub(crate) fn extract_text(bytes: &[u8]) -> Result<String, ExtractError> {
    match catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes))) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(ExtractError::parse("PDF", e.to_string())),
        Err(_) => Err(ExtractError::parse("PDF", "parser aborted on malformed input")),
    }
}
