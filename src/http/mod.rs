//! HTTP edge host.
//!
//! # Data Flow
//! ```text
//! Viewer connection
//!     → server.rs (Axum setup, request ID, trace, timeout)
//!     → routing::TenantRouter (host → tenant prefix, target rewrite)
//!     → forward.rs (address the shared origin)
//!     → Origin response streamed back to the viewer
//! ```
//!
//! Foreign hosts are answered with `421 Misdirected Request` and never
//! reach the origin.

pub mod forward;
pub mod request;
pub mod server;

pub use forward::{ForwardError, Origin};
pub use request::{MakeRequestUuidV4, RequestIdExt, X_REQUEST_ID};
pub use server::HttpServer;
