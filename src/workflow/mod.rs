//! Workflow execution subsystem.
//!
//! # Data Flow
//! ```text
//! InboundRequest + tenant id
//!     → store (ConfigLookup)      ─ NotFound/Unavailable → Failed (400/500)
//!     → transform (Transform)
//!     → invoker (Invoke)          ─ error → normalize → Failed
//!     → ExecutionResult::Success (Done)
//! ```
//!
//! # Design Decisions
//! - One execution per inbound request; executions share only the store
//! - Every path ends in exactly one ExecutionResult; errors never escape
//! - A single deadline bounds the whole run

pub mod executor;
pub mod state;
pub mod types;

pub use executor::{ExecutionOutcome, WorkflowExecutor};
pub use state::{ExecutionState, StateTracker};
pub use types::{ExecutionResult, Failure, FailureKind, InboundRequest};
