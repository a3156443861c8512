//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Edge handler produces:
//!     → logging.rs (structured log events, request id on every event)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Every refused host is logged at error level and counted
//! - Neither sink can influence the routing decision

pub mod logging;
pub mod metrics;
