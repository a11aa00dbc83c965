//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the webhook relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Destination webhook settings.
    pub webhook: WebhookConfig,

    /// Body size limits.
    pub limits: LimitsConfig,

    /// WebSocket bridge behavior.
    pub websocket: WebSocketConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Destination webhook configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct WebhookConfig {
    /// Webhook URL every notification is posted to.
    /// Overridden by `DISCORD_WEBHOOK_URL` when set.
    pub url: String,

    /// Optional timeout for one outbound call, in seconds.
    /// `None` lets a slow destination stall the caller.
    pub timeout_secs: Option<u64>,

    /// Ignore `HTTP_PROXY`/`HTTPS_PROXY` for outbound calls.
    pub no_proxy: bool,
}

/// Request body limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum inbound body size in bytes.
    pub max_body_size: usize,

    /// Longest serialized body (in UTF-16 code units) rendered inline.
    /// Anything longer ships as a file attachment.
    pub inline_body_chars: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
            inline_body_chars: 1900,
        }
    }
}

/// WebSocket bridge configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WebSocketConfig {
    /// Await the "new connection" notification before answering the upgrade.
    /// When false the notification is sent in the background.
    pub notify_before_handshake: bool,
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            notify_before_handshake: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
