//! Request rewriting for one base domain.
//!
//! # Responsibilities
//! - Read the host of an inbound request
//! - Map it to a tenant prefix
//! - Replace the request target, leaving everything else untouched
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Explicit error rather than silent pass-through for foreign hosts
//! - Only `Host` (or the HTTP/2 authority) is consulted, never other headers

use std::str::FromStr;

use axum::http::{header, uri::PathAndQuery, Request, Uri};
use serde::Serialize;

use crate::config::schema::RoutingConfig;
use crate::routing::domain::BaseDomain;
use crate::routing::error::RoutingError;
use crate::routing::path::{is_normalized, rewrite_target};
use crate::routing::tenant::{extract_tenant, TenantId};

/// Outcome of routing a host and request target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub tenant: TenantId,
    pub target: String,
}

/// Resolve the origin target for `host` and `target` without a full request.
pub fn resolve(host: &str, target: &str, base_domain: &BaseDomain) -> Result<Resolution, RoutingError> {
    let tenant = extract_tenant(host, base_domain)?;
    let target = rewrite_target(&tenant, target);
    debug_assert!(is_normalized(target.split('?').next().unwrap_or_default()));
    Ok(Resolution { tenant, target })
}

/// Rewrite `request` so its target points into the tenant's subtree.
///
/// Only the URI's path and query change. Method, version, headers,
/// extensions and body are returned as they came in. Targets without a
/// rooted path (authority form, asterisk form) are refused before the host
/// is consulted.
pub fn route<B>(request: Request<B>, base_domain: &BaseDomain) -> Result<Request<B>, RoutingError> {
    let resolution = {
        let original = origin_form_target(request.uri())?;
        let host = request_host(&request)?;
        resolve(host, original, base_domain)?
    };

    let path_and_query = PathAndQuery::from_str(&resolution.target).map_err(|_| {
        RoutingError::UnroutableTarget {
            target: resolution.target.clone(),
        }
    })?;

    let (mut parts, body) = request.into_parts();
    let mut uri_parts = parts.uri.into_parts();
    uri_parts.path_and_query = Some(path_and_query);
    parts.uri = Uri::from_parts(uri_parts).map_err(|_| RoutingError::UnroutableTarget {
        target: resolution.target.clone(),
    })?;

    tracing::trace!(
        tenant = %resolution.tenant,
        target = %resolution.target,
        "Request routed"
    );

    Ok(Request::from_parts(parts, body))
}

/// The path and query of `uri`, if it has a rooted path to prefix.
fn origin_form_target(uri: &Uri) -> Result<&str, RoutingError> {
    uri.path_and_query()
        .map(PathAndQuery::as_str)
        .filter(|target| target.starts_with('/'))
        .ok_or_else(|| RoutingError::UnsupportedTarget {
            target: uri.to_string(),
        })
}

/// The host a request was addressed to.
///
/// HTTP/1.1 carries it in `Host`; HTTP/2 requests may only carry the
/// `:authority` pseudo-header, which surfaces as the URI authority.
pub fn request_host<B>(request: &Request<B>) -> Result<&str, RoutingError> {
    if let Some(value) = request.headers().get(header::HOST) {
        return value.to_str().map_err(|_| RoutingError::InvalidHost {
            host: String::from_utf8_lossy(value.as_bytes()).into_owned(),
        });
    }

    request
        .uri()
        .authority()
        .map(|authority| authority.as_str().rsplit('@').next().unwrap_or_default())
        .ok_or(RoutingError::MissingHost)
}

/// Compiled router for one deployment.
#[derive(Debug, Clone)]
pub struct TenantRouter {
    base_domain: BaseDomain,
}

impl TenantRouter {
    pub fn new(base_domain: BaseDomain) -> Self {
        Self { base_domain }
    }

    pub fn from_config(config: &RoutingConfig) -> Self {
        Self::new(config.base_domain.clone())
    }

    pub fn base_domain(&self) -> &BaseDomain {
        &self.base_domain
    }

    pub fn route<B>(&self, request: Request<B>) -> Result<Request<B>, RoutingError> {
        route(request, &self.base_domain)
    }

    pub fn resolve(&self, host: &str, target: &str) -> Result<Resolution, RoutingError> {
        resolve(host, target, &self.base_domain)
    }
}
