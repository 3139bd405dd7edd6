//! LexCase Documents
//!
//! Turns uploaded files into bounded, normalized UTF-8 text.
//!
//! # Supported formats
//!
//! - Plain text (`text/plain`, `.txt`)
//! - PDF (`application/pdf`, `.pdf`)
//! - Word (`.doc`, `.docx` and their MIME types), read as WordprocessingML
//!
//! Every upload is checked against [`ExtractionLimits::max_file_bytes`] before
//! any parser runs, and extracted text is cut to
//! [`ExtractionLimits::max_text_chars`].
//!
//! # Example
//!
//! ```
//! use lexcase_documents::{TextExtractor, Upload};
//!
//! let extractor = TextExtractor::default();
//! let upload = Upload::new(b"This Agreement is made".to_vec(), "text/plain", "nda.txt");
//! let extracted = extractor.extract_blocking(upload).unwrap();
//! assert_eq!(extracted.text, "This Agreement is made");
//! ```

#![warn(missing_docs)]

mod docx;
mod error;
mod extractor;
mod kind;
mod pdf;

pub use error::ExtractError;
pub use extractor::{ExtractedText, ExtractionLimits, TextExtractor, Upload};
pub use kind::DocumentKind;
