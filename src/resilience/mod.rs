//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Execution start:
//!     → timeouts.rs (one Deadline for the whole run)
//!     → config lookup bounded by the deadline
//!     → outbound call bounded by min(invoke timeout, remaining)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - No retries at this layer; the caller owns retry policy

pub mod timeouts;

pub use timeouts::{Deadline, DeadlineExceeded};
