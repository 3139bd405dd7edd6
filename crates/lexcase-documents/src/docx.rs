//! DOCX text extraction
//!
//! A DOCX file is a zip archive; the body lives in `word/document.xml`.
//! Text runs (`<w:t>`) are concatenated, paragraph ends become newlines and
//! tabs/breaks are kept. Formatting is discarded.

use crate::error::ExtractError;
use regex::Regex;
use std::io::{Cursor, Read};
use std::sync::OnceLock;
use tracing::warn;
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";

fn markup_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)<w:t(?:\s[^>]*)?>(.*?)</w:t>|</w:p>|<w:tab\s*/>|<w:br\s*/>|<w:cr\s*/>")
            .expect("static regex is valid")
    })
}

/// Extract plain text from a DOCX held in memory
///
/// `max_xml_bytes` bounds the decompressed size of `word/document.xml`.
pub(crate) fn extract_text(bytes: &[u8], max_xml_bytes: usize) -> Result<String, ExtractError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| {
        ExtractError::parse("DOCX", format!("not a DOCX container ({})", e))
    })?;

    let mut part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| ExtractError::parse("DOCX", format!("missing {} ({})", DOCUMENT_PART, e)))?;

    let declared = usize::try_from(part.size()).unwrap_or(usize::MAX);
    if declared > max_xml_bytes {
        warn!(
            "DOCX body declares {} bytes uncompressed (max {})",
            declared, max_xml_bytes
        );
        return Err(ExtractError::FileTooLarge {
            size: declared,
            max: max_xml_bytes,
        });
    }

    // The declared size comes from the archive and cannot be trusted.
    let mut raw = Vec::new();
    part.by_ref()
        .take(max_xml_bytes as u64 + 1)
        .read_to_end(&mut raw)
        .map_err(|e| ExtractError::parse("DOCX", e.to_string()))?;

    if raw.len() > max_xml_bytes {
        warn!("DOCX body inflates past {} bytes", max_xml_bytes);
        return Err(ExtractError::FileTooLarge {
            size: raw.len(),
            max: max_xml_bytes,
        });
    }

    let xml = String::from_utf8(raw)
        .map_err(|e| ExtractError::parse("DOCX", format!("{} is not UTF-8 ({})", DOCUMENT_PART, e)))?;

    Ok(xml_to_text(&xml))
}

/// Walk WordprocessingML and keep only the visible text
fn xml_to_text(xml: &str) -> String {
    let mut text = String::with_capacity(xml.len() / 4);

    for caps in markup_pattern().captures_iter(xml) {
        if let Some(run) = caps.get(1) {
            text.push_str(&unescape(run.as_str()));
            continue;
        }
        match caps.get(0).map(|m| m.as_str()) {
            Some("</w:p>") => text.push('\n'),
            Some(tag) if tag.starts_with("<w:tab") => text.push('\t'),
            Some(_) => text.push('\n'),
            None => {}
        }
    }

    text
}

/// Decode the predefined XML entities and numeric character references.
///
/// Unknown or malformed references are kept as written.
fn unescape(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .find(';')
            .filter(|&end| end <= MAX_ENTITY_LEN)
            .and_then(|end| decode_entity(&tail[1..end]).map(|c| (c, end)));
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Longest reference body we look for, `#x10FFFF` plus slack
const MAX_ENTITY_LEN: usize = 10;

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "amp" => Some('&'),
        _ => {
            let numeric = name.strip_prefix('#')?;
            let code = match numeric.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None if numeric.bytes().all(|b| b.is_ascii_digit()) => numeric.parse().ok()?,
                None => return None,
            };
            char::from_u32(code)
        }
    }
}
