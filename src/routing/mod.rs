//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (host, path?query, headers, body)
//!     → tenant.rs (host → TenantId, relative to BaseDomain)
//!     → path.rs (compose "/" + tenant + path, collapse separators)
//!     → router.rs (swap the request target, keep everything else)
//!     → Return: rewritten request or RoutingError
//! ```
//!
//! # Design Decisions
//! - Base domain parsed once at startup, immutable at runtime
//! - No regex: explicit suffix match plus explicit normalization
//! - Deterministic: same input always yields the same target
//! - Foreign hosts are an error, never a pass-through

pub mod domain;
pub mod error;
pub mod path;
pub mod router;
pub mod tenant;

pub use domain::{BaseDomain, DomainError};
pub use error::RoutingError;
pub use router::{resolve, route, Resolution, TenantRouter};
pub use tenant::TenantId;
