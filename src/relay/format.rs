//! Notification payloads and request rendering.

use serde::{Deserialize, Serialize};

use crate::relay::error::RelayResult;
use crate::relay::guard::{json_fence, Attachment, SizeGuard};
use crate::relay::snapshot::RequestSnapshot;

/// Content of the notification sent when a WebSocket upgrade arrives.
pub const WEBSOCKET_OPENED: &str = "Websocket request received";

/// Title of the request embed.
pub const REQUEST_EMBED_TITLE: &str = "Request Details";

/// Message posted to the destination webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    pub fields: Vec<EmbedField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

impl EmbedField {
    fn new(name: &str, value: impl Into<String>, inline: bool) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
            inline,
        }
    }
}

impl NotificationPayload {
    /// A content-only payload.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            embeds: Vec::new(),
        }
    }

    /// Sent once per upgrade request.
    pub fn websocket_opened() -> Self {
        Self::text(WEBSOCKET_OPENED)
    }

    /// Sent for every text message received on a socket.
    pub fn socket_message(message: &str) -> Self {
        Self::text(format!("WebSocket message received: `{}`", message))
    }
}

/// Render a request into its notification and optional body attachment.
///
/// Fields are Method, Content-Type, Headers and Body, in that order.
pub fn format_request(
    snapshot: &RequestSnapshot,
    guard: &SizeGuard,
) -> RelayResult<(NotificationPayload, Option<Attachment>)> {
    let body_string = snapshot.body.to_pretty_json()?;
    let headers_string = serde_json::to_string_pretty(&snapshot.headers)?;
    let (body_field, attachment) = guard.render(body_string).into_parts();

    let payload = NotificationPayload {
        content: format!("New {} request received at {}", snapshot.method, snapshot.url),
        embeds: vec![Embed {
            title: REQUEST_EMBED_TITLE.to_string(),
            fields: vec![
                EmbedField::new("Method", snapshot.method.as_str(), true),
                EmbedField::new("Content-Type", snapshot.content_type.as_str(), true),
                EmbedField::new("Headers", json_fence(&headers_string), false),
                EmbedField::new("Body", body_field, false),
            ],
        }],
    };

    Ok((payload, attachment))
}
