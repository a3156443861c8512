//! Routing failures.
//!
//! Apart from `UnsupportedTarget`, every variant means the request reached
//! the router from a host outside the served domain family. None of them is
//! recoverable inside the router, and retrying reproduces the same result.

use thiserror::Error;

/// A request the router refuses to map onto a tenant prefix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// Neither a `Host` header nor a URI authority was present.
    #[error("request carries no Host header")]
    MissingHost,

    /// The `Host` header was empty or not visible ASCII.
    #[error("Host header `{host}` is not a valid host name")]
    InvalidHost { host: String },

    /// The host is neither the base domain nor one of its subdomains.
    #[error("host `{host}` is outside the served domain `{base_domain}`")]
    ForeignHost { host: String, base_domain: String },

    /// The host ends in the base domain but its tenant labels are malformed.
    #[error("host `{host}` carries a malformed tenant label")]
    MalformedTenant { host: String },

    /// The request target is not in origin form (`CONNECT host:port`,
    /// `OPTIONS *`), so there is no path to prefix.
    #[error("request target `{target}` has no path to route")]
    UnsupportedTarget { target: String },

    /// The composed target could not be turned back into a request URI.
    #[error("rewritten target `{target}` is not a valid request target")]
    UnroutableTarget { target: String },
}

impl RoutingError {
    /// Short, stable label used for metrics and structured logs.
    pub fn reason(&self) -> &'static str {
        match self {
            RoutingError::MissingHost => "missing_host",
            RoutingError::InvalidHost { .. } => "invalid_host",
            RoutingError::ForeignHost { .. } => "foreign_host",
            RoutingError::MalformedTenant { .. } => "malformed_tenant",
            RoutingError::UnsupportedTarget { .. } => "unsupported_target",
            RoutingError::UnroutableTarget { .. } => "unroutable_target",
        }
    }

    /// Whether the request was addressed to a host this deployment does not serve.
    ///
    /// `UnsupportedTarget` is a malformed request instead, refused before any
    /// host is looked at.
    pub fn is_invariant_violation(&self) -> bool {
        !matches!(self, RoutingError::UnsupportedTarget { .. })
    }
}
