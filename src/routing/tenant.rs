//! Tenant extraction from the Host header.
//!
//! # Responsibilities
//! - Reduce a raw Host value to a bare lowercase host name
//! - Strip exactly one trailing occurrence of the base domain
//! - Reject hosts outside the served domain family
//!
//! # Design Decisions
//! - Host comparison is case-insensitive (DNS names)
//! - The suffix must sit on a label boundary: `blogexample.com` is foreign
//! - Multi-label prefixes stay one tenant (`a.b`), never nested tenants
//! - Tenant labels are restricted to `[a-z0-9-_]` so a tenant can never
//!   smuggle a path separator into the composed prefix

use std::fmt;

use serde::Serialize;

use crate::routing::domain::BaseDomain;
use crate::routing::error::RoutingError;

/// Identifier of one hosted site. Empty for apex requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// The tenant served at the base domain itself (storage root).
    pub fn apex() -> Self {
        Self(String::new())
    }

    pub fn is_apex(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_apex() {
            f.write_str("<apex>")
        } else {
            f.write_str(&self.0)
        }
    }
}

/// Derive the tenant for `host` relative to `base_domain`.
pub fn extract_tenant(host: &str, base_domain: &BaseDomain) -> Result<TenantId, RoutingError> {
    let name = host_name(host)?;
    let base = base_domain.as_str();

    if name == base {
        return Ok(TenantId::apex());
    }

    let prefix = name
        .strip_suffix(base)
        .and_then(|rest| rest.strip_suffix('.'))
        .ok_or_else(|| RoutingError::ForeignHost {
            host: host.to_string(),
            base_domain: base.to_string(),
        })?;

    if !prefix.split('.').all(is_valid_label) {
        return Err(RoutingError::MalformedTenant {
            host: host.to_string(),
        });
    }

    Ok(TenantId(prefix.to_string()))
}

/// Lowercase host name with any port and one trailing dot removed.
fn host_name(raw: &str) -> Result<String, RoutingError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RoutingError::InvalidHost {
            host: raw.to_string(),
        });
    }

    let without_port = match trimmed.rsplit_once(':') {
        Some((name, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => name,
        _ => trimmed,
    };
    let name = without_port.strip_suffix('.').unwrap_or(without_port);

    if name.is_empty() {
        return Err(RoutingError::InvalidHost {
            host: raw.to_string(),
        });
    }

    Ok(name.to_ascii_lowercase())
}

fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_')
}
