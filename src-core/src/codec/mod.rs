//! Serialization Codec
//!
//! Converts todo lists to and from JSON and XML documents and tells the two
//! formats apart for imports.

mod json;
mod xml;

pub use json::{decode_json, encode_json, is_valid_json};
pub use xml::{decode_xml, encode_xml, is_valid_xml, XmlListElement};

use thiserror::Error;
use crate::domain::DomainError;

/// Why a document could not be encoded or decoded
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid XML: {0}")]
    Xml(String),
}

impl From<CodecError> for DomainError {
    fn from(err: CodecError) -> Self {
        DomainError::Serialization(err.to_string())
    }
}

/// Supported transfer formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Xml,
}

impl Format {
    /// Parse the `format` parameter of an export request
    pub fn from_param(raw: &str) -> Option<Self> {
        match raw {
            "json" => Some(Format::Json),
            "xml" => Some(Format::Xml),
            _ => None,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Format::Json => "application/json",
            Format::Xml => "application/xml",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            Format::Json => "todos.json",
            Format::Xml => "todos.xml",
        }
    }
}

/// Drop a leading UTF-8 byte order mark
pub fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}

/// Guess the format of an uploaded document. XML wins when both would match.
/// A leading byte order mark is ignored.
pub fn detect_format(text: &str) -> Option<Format> {
    let text = strip_bom(text);
    if is_valid_xml(text) {
        Some(Format::Xml)
    } else if is_valid_json(text) {
        Some(Format::Json)
    } else {
        None
    }
}
