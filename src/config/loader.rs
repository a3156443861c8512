//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::RouterConfig;
use crate::config::validation::{validate_config, ValidationError};

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

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<RouterConfig, ConfigError> {
    let config: RouterConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RouterConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::LogFormat;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = parse_config("[routing]\nbase_domain = \"Sites.Example.NET\"\n").unwrap();
        assert_eq!(config.routing.base_domain.as_str(), "sites.example.net");
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.timeouts.request_secs, 30);
        assert!(config.origin.rewrite_host_header);
    }

    #[test]
    fn test_full_config() {
        let config = parse_config(
            r#"
            [routing]
            base_domain = "example.com"

            [listener]
            bind_address = "127.0.0.1:8443"

            [origin]
            url = "http://bucket.internal:8000"
            rewrite_host_header = false

            [timeouts]
            request_secs = 5

            [observability]
            log_level = "debug"
            log_format = "json"
            metrics_enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(config.origin.url, "http://bucket.internal:8000");
        assert!(!config.origin.rewrite_host_header);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_bad_base_domain_is_a_parse_error() {
        let err = parse_config("[routing]\nbase_domain = \"https://example.com\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "{err}");
    }

    #[test]
    fn test_semantic_errors_are_reported() {
        let err = parse_config("[timeouts]\nrequest_secs = 0\n").unwrap_err();
        match err {
            ConfigError::Validation(errors) => {
                assert_eq!(errors, vec![ValidationError::ZeroRequestTimeout]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_from_disk() {
        let path = std::env::temp_dir().join(format!("tenant-router-{}.toml", std::process::id()));
        fs::write(&path, "[routing]\nbase_domain = \"example.org\"\n").unwrap();
        let config = load_config(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(config.routing.base_domain.as_str(), "example.org");

        assert!(matches!(load_config(&path), Err(ConfigError::Io(_))));
    }
}
