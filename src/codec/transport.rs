use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use super::sanitize::{SanitizationError, clean, deep_clean, is_control, validate_no_control_characters};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Sanitization(#[from] SanitizationError),

    #[error("json serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("escaped payload is no longer valid json: {0}")]
    InvalidAfterEscape(#[source] serde_json::Error),

    #[error("base64 decode: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("decoded payload is not utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Encodes arbitrary Unicode text for a URL fragment: UTF-8 bytes, then
/// standard base64.
///
/// Input is expected to be sanitized already. A leak gets one cleaning
/// pass before the error is surfaced.
pub fn encode(text: &str) -> Result<String, SanitizationError> {
    if let Err(err) = validate_no_control_characters(text) {
        warn!(codes = ?err.codes, "control characters reached the encoder, cleaning input");
        let cleaned = clean(text);
        validate_no_control_characters(&cleaned)?;
        return Ok(STANDARD.encode(cleaned.as_bytes()));
    }
    Ok(STANDARD.encode(text.as_bytes()))
}

pub fn decode(encoded: &str) -> Result<String, TransportError> {
    let bytes = STANDARD.decode(encoded.trim())?;
    Ok(String::from_utf8(bytes)?)
}

/// JSON-serializes `document` after cleaning every string in it.
///
/// If raw control characters still show up in the output they are escaped
/// one by one and the result must parse again.
pub fn serialize_for_transport<T: Serialize>(document: &T) -> Result<String, TransportError> {
    let value = serde_json::to_value(document)?;
    let json = serde_json::to_string(&deep_clean(&value))?;

    if !json.chars().any(is_control) {
        return Ok(json);
    }

    warn!("raw control characters in serialized blueprint, escaping");
    let escaped = escape_raw_controls(&json);
    serde_json::from_str::<Value>(&escaped).map_err(TransportError::InvalidAfterEscape)?;
    validate_no_control_characters(&escaped)?;
    Ok(escaped)
}

fn escape_raw_controls(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '\u{8}' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\u{c}' => out.push_str("\\f"),
            '\r' => out.push_str("\\r"),
            c if is_control(c) => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// `<host>/#<encoded>` or `<host>/studio/#<encoded>`.
pub fn share_url(host: &str, encoded: &str, studio: bool) -> String {
    let host = host.trim_end_matches('/');
    if studio {
        format!("{}/studio/#{}", host, encoded)
    } else {
        format!("{}/#{}", host, encoded)
    }
}
