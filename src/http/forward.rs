//! Forwarding rewritten requests to the shared origin.
//!
//! # Responsibilities
//! - Resolve the configured origin URL once
//! - Point a rewritten request at the origin (scheme + authority)
//! - Optionally present the origin authority as `Host`, the way a CDN
//!   addresses a bucket website endpoint
//!
//! # Design Decisions
//! - Path and query are never touched here; the router owns them
//! - The origin is always spoken to over HTTP/1.1, whatever the viewer used

use std::str::FromStr;

use axum::http::{
    header,
    uri::{Authority, Scheme},
    HeaderValue, Request, Response, Uri, Version,
};
use axum::body::Body;
use thiserror::Error;

use crate::config::validation::parse_origin_url;
use crate::config::OriginConfig;

/// Response type returned by the origin client.
pub type OriginResponse = Response<hyper::body::Incoming>;

#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("invalid origin `{url}`: {reason}")]
    InvalidOrigin { url: String, reason: String },

    #[error("failed to build origin URI: {0}")]
    Uri(#[from] axum::http::uri::InvalidUriParts),

    #[error("origin request failed: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),
}

/// Resolved origin endpoint.
#[derive(Debug, Clone)]
pub struct Origin {
    authority: Authority,
    host_header: Option<HeaderValue>,
}

impl Origin {
    pub fn from_config(config: &OriginConfig) -> Result<Self, ForwardError> {
        let invalid = |reason: String| ForwardError::InvalidOrigin {
            url: config.url.clone(),
            reason,
        };

        let url = parse_origin_url(&config.url).map_err(invalid)?;
        let host = url.host_str().ok_or_else(|| invalid("missing host".to_string()))?;
        let authority = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let authority = Authority::from_str(&authority).map_err(|e| invalid(e.to_string()))?;

        let host_header = if config.rewrite_host_header {
            Some(HeaderValue::from_str(authority.as_str()).map_err(|e| invalid(e.to_string()))?)
        } else {
            None
        };

        Ok(Self {
            authority,
            host_header,
        })
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Address `request` to the origin, keeping its path and query.
    pub fn prepare<B>(&self, request: Request<B>) -> Result<Request<B>, ForwardError> {
        let (mut parts, body) = request.into_parts();

        let mut uri_parts = parts.uri.into_parts();
        uri_parts.scheme = Some(Scheme::HTTP);
        uri_parts.authority = Some(self.authority.clone());
        parts.uri = Uri::from_parts(uri_parts)?;
        // The origin client is HTTP/1 only; h2 viewers must not leak their version.
        parts.version = Version::HTTP_11;

        if let Some(host) = &self.host_header {
            parts.headers.insert(header::HOST, host.clone());
        }

        Ok(Request::from_parts(parts, body))
    }
}

/// Stream an origin response back to the viewer unchanged.
pub fn into_viewer_response(response: OriginResponse) -> Response<Body> {
    let (parts, body) = response.into_parts();
    Response::from_parts(parts, Body::new(body))
}
