//! Request body classification and decoding.
//!
//! The declared content type picks exactly one decoder. Decoding never fails:
//! a body declared as JSON that does not parse becomes
//! [`RequestBody::JsonParseError`] and is still reported.

use serde::Serialize;
use serde_json::{Map, Value};

/// Content type recorded when the request declares none.
pub const UNKNOWN_CONTENT_TYPE: &str = "unknown";

/// Decoded request body.
///
/// Serializes to the shape rendered into the notification: JSON values as-is,
/// form fields as an object, text as a string, and parse failures as
/// `{"error": ..., "data": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RequestBody {
    Json(Value),
    JsonParseError {
        #[serde(rename = "error")]
        message: String,
        #[serde(rename = "data")]
        raw_text: String,
    },
    FormFields(Map<String, Value>),
    Text(String),
}

/// Which decoder a content type selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Json,
    Form,
    Text,
}

impl BodyKind {
    /// Classify a declared content type by substring, the same way for every
    /// parameter suffix (`; charset=...`).
    pub fn classify(content_type: &str) -> Self {
        if content_type.contains("application/json") {
            BodyKind::Json
        } else if content_type.contains("application/x-www-form-urlencoded") {
            BodyKind::Form
        } else {
            BodyKind::Text
        }
    }
}

impl RequestBody {
    /// Decode a fully read body according to its declared content type.
    pub fn decode(content_type: &str, bytes: &[u8]) -> Self {
        match BodyKind::classify(content_type) {
            BodyKind::Json => decode_json(bytes),
            BodyKind::Form => decode_form(bytes),
            BodyKind::Text => decode_text(bytes),
        }
    }

    /// Render as 2-space indented JSON.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Parse as JSON, falling back to the raw text on failure.
pub fn decode_json(bytes: &[u8]) -> RequestBody {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(value) => RequestBody::Json(value),
        Err(e) => RequestBody::JsonParseError {
            message: e.to_string(),
            raw_text: String::from_utf8_lossy(bytes).into_owned(),
        },
    }
}

/// Decode `application/x-www-form-urlencoded`. Fields keep the order in
/// which each name first appears; a repeated name takes its last value.
pub fn decode_form(bytes: &[u8]) -> RequestBody {
    let fields = url::form_urlencoded::parse(bytes)
        .map(|(name, value)| (name.into_owned(), Value::String(value.into_owned())))
        .collect::<Map<_, _>>();
    RequestBody::FormFields(fields)
}

/// Take the body as text. Invalid UTF-8 is replaced, not rejected.
pub fn decode_text(bytes: &[u8]) -> RequestBody {
    RequestBody::Text(String::from_utf8_lossy(bytes).into_owned())
}
