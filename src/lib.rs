//! Host-based tenant routing for a multi-tenant static-site platform.
//!
//! One wildcard domain, one CDN distribution and one shared bucket serve
//! every tenant. Each viewer request is rewritten from
//! `https://<tenant>.<base_domain>/<path>` to `/<tenant>/<path>` on the
//! origin; requests for the apex are served from the bucket root.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::RouterConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{route, BaseDomain, RoutingError, TenantRouter};
