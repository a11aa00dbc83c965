//! Immutable view of one inbound request.

use std::collections::BTreeMap;

use crate::relay::body::{RequestBody, UNKNOWN_CONTENT_TYPE};

/// Everything the formatter needs from an inbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSnapshot {
    pub method: String,
    pub url: String,
    /// Lowercased header names; repeated headers merged with `", "`.
    pub headers: BTreeMap<String, String>,
    pub content_type: String,
    pub body: RequestBody,
}

impl RequestSnapshot {
    /// Build a snapshot by decoding a fully read body.
    ///
    /// The content type is taken from the `content-type` header, or
    /// [`UNKNOWN_CONTENT_TYPE`] if absent.
    pub fn new(
        method: impl Into<String>,
        url: impl Into<String>,
        headers: BTreeMap<String, String>,
        body: &[u8],
    ) -> Self {
        let content_type = headers
            .get("content-type")
            .cloned()
            .unwrap_or_else(|| UNKNOWN_CONTENT_TYPE.to_string());
        let body = RequestBody::decode(&content_type, body);

        Self {
            method: method.into(),
            url: url.into(),
            headers,
            content_type,
            body,
        }
    }
}
