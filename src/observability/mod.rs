//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, one span per execution)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID and execution ID are span fields (request span wraps the
//!   execution span), so events inside a request carry both
//! - Metrics are cheap; without a recorder installed they are no-ops

pub mod logging;
pub mod metrics;
