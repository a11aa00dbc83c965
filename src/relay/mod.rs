//! Request-to-notification relay.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → snapshot.rs (method, url, headers, content type)
//!     → body.rs (JSON / form / text decoding)
//!     → format.rs (embed layout)
//!     → guard.rs (inline or attachment)
//!     → dispatch.rs (multipart POST to the webhook)
//!
//! socket message
//!     → format.rs (content-only payload)
//!     → dispatch.rs
//! ```
//!
//! # Design Decisions
//! - Exactly one dispatch per request, per upgrade and per socket message
//! - No retries; destination failures are reported once
//! - No state shared between requests

pub mod body;
pub mod dispatch;
pub mod error;
pub mod format;
pub mod guard;
pub mod snapshot;

pub use body::{BodyKind, RequestBody};
pub use dispatch::{DispatchOutcome, DispatchSource, WebhookDispatcher};
pub use error::{RelayError, RelayResult};
pub use format::{format_request, Embed, EmbedField, NotificationPayload};
pub use guard::{Attachment, BodyRendering, SizeGuard};
pub use snapshot::RequestSnapshot;

use crate::config::RelayConfig;
use crate::observability::metrics;

/// Formatter and dispatcher bound to one configuration.
#[derive(Debug, Clone)]
pub struct Relay {
    dispatcher: WebhookDispatcher,
    guard: SizeGuard,
}

impl Relay {
    pub fn new(dispatcher: WebhookDispatcher, guard: SizeGuard) -> Self {
        Self { dispatcher, guard }
    }

    pub fn from_config(config: &RelayConfig) -> RelayResult<Self> {
        Ok(Self::new(
            WebhookDispatcher::new(&config.webhook)?,
            SizeGuard::new(config.limits.inline_body_chars),
        ))
    }

    pub fn dispatcher(&self) -> &WebhookDispatcher {
        &self.dispatcher
    }

    /// Format and send one inbound request.
    pub async fn relay_request(&self, snapshot: &RequestSnapshot) -> RelayResult<DispatchOutcome> {
        let (payload, attachment) = format_request(snapshot, &self.guard)?;
        if attachment.is_some() {
            metrics::record_body_attachment();
        }
        self.dispatcher
            .dispatch(DispatchSource::Request, &payload, attachment)
            .await
    }

    /// Announce a WebSocket upgrade.
    pub async fn notify_upgrade(&self) -> RelayResult<DispatchOutcome> {
        self.dispatcher
            .dispatch(DispatchSource::Upgrade, &NotificationPayload::websocket_opened(), None)
            .await
    }

    /// Report one message received on a socket.
    pub async fn relay_socket_message(&self, message: &str) -> RelayResult<DispatchOutcome> {
        self.dispatcher
            .dispatch(
                DispatchSource::SocketMessage,
                &NotificationPayload::socket_message(message),
                None,
            )
            .await
    }
}
