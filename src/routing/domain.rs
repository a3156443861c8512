//! The base domain every tenant hangs off.
//!
//! # Design Decisions
//! - Parsed once at configuration time, never per request
//! - Stored lowercase with no trailing dot so suffix checks are plain byte
//!   comparisons
//! - Never interpolated into a pattern; matching is an explicit suffix check

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while parsing a configured base domain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("base domain is empty")]
    Empty,

    #[error("base domain `{0}` must be a bare host name without scheme, port or path")]
    NotBareHost(String),

    #[error("base domain `{0}` has an empty label")]
    EmptyLabel(String),

    #[error("base domain `{domain}` contains invalid character `{ch}`")]
    InvalidCharacter { domain: String, ch: char },
}

/// The root serving domain whose wildcard subdomains are routed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BaseDomain(String);

impl BaseDomain {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for BaseDomain {
    fn default() -> Self {
        Self("example.com".to_string())
    }
}

impl FromStr for BaseDomain {
    type Err = DomainError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let name = trimmed.strip_suffix('.').unwrap_or(trimmed);

        if name.is_empty() {
            return Err(DomainError::Empty);
        }
        if name.contains(|c: char| matches!(c, ':' | '/' | '?' | '#' | '@')) {
            return Err(DomainError::NotBareHost(raw.to_string()));
        }
        if name.split('.').any(str::is_empty) {
            return Err(DomainError::EmptyLabel(raw.to_string()));
        }
        if let Some(ch) = name.chars().find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '.')) {
            return Err(DomainError::InvalidCharacter {
                domain: raw.to_string(),
                ch,
            });
        }

        Ok(Self(name.to_ascii_lowercase()))
    }
}

impl TryFrom<String> for BaseDomain {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BaseDomain> for String {
    fn from(domain: BaseDomain) -> Self {
        domain.0
    }
}

impl fmt::Display for BaseDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_case_and_trailing_dot() {
        let domain: BaseDomain = " Example.COM. ".parse().unwrap();
        assert_eq!(domain.as_str(), "example.com");
    }

    #[test]
    fn test_rejects_non_bare_hosts() {
        assert_eq!("".parse::<BaseDomain>(), Err(DomainError::Empty));
        assert!(matches!(
            "https://example.com".parse::<BaseDomain>(),
            Err(DomainError::NotBareHost(_))
        ));
        assert!(matches!(
            "example.com:8080".parse::<BaseDomain>(),
            Err(DomainError::NotBareHost(_))
        ));
        assert!(matches!(
            ".example.com".parse::<BaseDomain>(),
            Err(DomainError::EmptyLabel(_))
        ));
        assert!(matches!(
            "exa*mple.com".parse::<BaseDomain>(),
            Err(DomainError::InvalidCharacter { ch: '*', .. })
        ));
    }

    #[test]
    fn test_single_label_domain_is_allowed() {
        let domain: BaseDomain = "localhost".parse().unwrap();
        assert_eq!(domain.to_string(), "localhost");
    }
}
