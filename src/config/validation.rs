//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic, `BaseDomain` parses itself)
//! - Validate addresses, the origin URL and value ranges
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;
use url::Url;

use crate::config::schema::RouterConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("origin.url `{url}`: {reason}")]
    OriginUrl { url: String, reason: String },

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("observability.log_level `{0}` is not a log level")]
    LogLevel(String),

    #[error("observability.metrics_address `{0}` is not a socket address")]
    MetricsAddress(String),

    #[error("observability.metrics_address `{0}` collides with listener.bind_address")]
    AddressCollision(String),
}

/// Check a configuration before it is used.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let bind = config.listener.bind_address.parse::<SocketAddr>();
    if bind.is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if let Err(reason) = parse_origin_url(&config.origin.url) {
        errors.push(ValidationError::OriginUrl {
            url: config.origin.url.clone(),
            reason,
        });
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if LevelFilter::from_str(&config.observability.log_level).is_err() {
        errors.push(ValidationError::LogLevel(config.observability.log_level.clone()));
    }

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(metrics) if bind.as_ref().is_ok_and(|b| b.port() == metrics.port()) => {
                errors.push(ValidationError::AddressCollision(
                    config.observability.metrics_address.clone(),
                ));
            }
            Ok(_) => {}
            Err(_) => errors.push(ValidationError::MetricsAddress(
                config.observability.metrics_address.clone(),
            )),
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Parse an origin URL, accepting only `http://host[:port][/]`.
pub fn parse_origin_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;

    if url.scheme() != "http" {
        return Err(format!("scheme `{}` is not supported, use http", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
        return Err("must not carry a path, query or fragment".to_string());
    }

    Ok(url)
}
