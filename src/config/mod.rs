//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) + DISCORD_WEBHOOK_URL
//!     → loader.rs (parse, env overrides)
//!     → validation.rs (semantic checks)
//!     → RelayConfig (validated, immutable)
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → server swaps its per-invocation state
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_from_env, ConfigError, WEBHOOK_URL_ENV};
pub use schema::{
    LimitsConfig, ListenerConfig, ObservabilityConfig, RelayConfig, WebSocketConfig,
    WebhookConfig,
};
pub use validation::{validate_config, ValidationError};
pub use watcher::ConfigWatcher;
