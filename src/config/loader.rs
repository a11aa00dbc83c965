//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::RelayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable that overrides `webhook.url`.
pub const WEBHOOK_URL_ENV: &str = "DISCORD_WEBHOOK_URL";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RelayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: RelayConfig = toml::from_str(&content)?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Build a configuration from defaults and environment alone.
pub fn load_from_env() -> Result<RelayConfig, ConfigError> {
    let mut config = RelayConfig::default();
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply environment overrides using the given lookup.
pub fn apply_env_overrides<F>(config: &mut RelayConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(WEBHOOK_URL_ENV).filter(|v| !v.is_empty()) {
        config.webhook.url = url;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_env_override_wins() {
        let mut config = RelayConfig::default();
        config.webhook.url = "https://from-file.example/hook".to_string();

        apply_env_overrides(&mut config, |key| {
            (key == WEBHOOK_URL_ENV).then(|| "https://from-env.example/hook".to_string())
        });

        assert_eq!(config.webhook.url, "https://from-env.example/hook");
    }

    #[test]
    fn test_empty_env_ignored() {
        let mut config = RelayConfig::default();
        config.webhook.url = "https://from-file.example/hook".to_string();

        apply_env_overrides(&mut config, |_| Some(String::new()));

        assert_eq!(config.webhook.url, "https://from-file.example/hook");
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[listener]\nbind_address = \"nope\"").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("listener.bind_address"));
    }

    #[test]
    fn test_load_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[webhook\nurl = ").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
