//! Outbound webhook calls.
//!
//! # Responsibilities
//! - POST one multipart request per notification
//! - Attach an oversized body as a `files[]` part
//! - Report the destination's status without retrying
//!
//! # Wire Format
//! ```text
//! POST <webhook url>
//! Content-Type: multipart/form-data
//!     payload_json = {"content": ..., "embeds": [...]}
//!     files[]      = <attachment> (application/json, filename = attachment name)
//! ```

use std::time::{Duration, Instant};

use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use url::Url;

use crate::config::WebhookConfig;
use crate::observability::metrics;
use crate::relay::error::RelayResult;
use crate::relay::format::NotificationPayload;
use crate::relay::guard::Attachment;

/// Which flow produced a dispatch. Used as a metrics label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchSource {
    Request,
    Upgrade,
    SocketMessage,
}

impl DispatchSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchSource::Request => "request",
            DispatchSource::Upgrade => "upgrade",
            DispatchSource::SocketMessage => "socket_message",
        }
    }
}

/// What the destination said about one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Delivered,
    Rejected {
        status: StatusCode,
        status_text: String,
    },
}

impl DispatchOutcome {
    fn from_status(status: StatusCode) -> Self {
        if status.is_success() {
            DispatchOutcome::Delivered
        } else {
            DispatchOutcome::Rejected {
                status,
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            }
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, DispatchOutcome::Delivered)
    }
}

/// Client for the destination webhook. One attempt per call.
#[derive(Debug, Clone)]
pub struct WebhookDispatcher {
    client: reqwest::Client,
    url: Url,
}

impl WebhookDispatcher {
    pub fn new(config: &WebhookConfig) -> RelayResult<Self> {
        let url = Url::parse(&config.url)?;

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if config.no_proxy {
            builder = builder.no_proxy();
        }

        Ok(Self {
            client: builder.build().map_err(reqwest::Error::without_url)?,
            url,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Send a notification and, if present, its attachment.
    pub async fn dispatch(
        &self,
        source: DispatchSource,
        payload: &NotificationPayload,
        attachment: Option<Attachment>,
    ) -> RelayResult<DispatchOutcome> {
        let start_time = Instant::now();
        let has_attachment = attachment.is_some();

        let mut form = Form::new().text("payload_json", serde_json::to_string(payload)?);
        if let Some(attachment) = attachment {
            let part = Part::text(attachment.contents)
                .file_name(attachment.name)
                .mime_str("application/json")?;
            form = form.part("files[]", part);
        }

        let result = self.client.post(self.url.clone()).multipart(form).send().await;
        let response = match result {
            Ok(response) => response,
            Err(e) => {
                metrics::record_dispatch(source, "error", start_time);
                // The webhook URL carries its token; keep it out of messages.
                return Err(e.without_url().into());
            }
        };

        let outcome = DispatchOutcome::from_status(response.status());
        match &outcome {
            DispatchOutcome::Delivered => {
                metrics::record_dispatch(source, "delivered", start_time);
                tracing::debug!(
                    source = source.as_str(),
                    attachment = has_attachment,
                    "Notification delivered"
                );
            }
            DispatchOutcome::Rejected { status, .. } => {
                metrics::record_dispatch(source, "rejected", start_time);
                tracing::warn!(
                    source = source.as_str(),
                    status = status.as_u16(),
                    "Webhook rejected notification"
                );
            }
        }

        Ok(outcome)
    }
}
