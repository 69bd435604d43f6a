//! Timeout enforcement.
//!
//! # Responsibilities
//! - Give each execution a single overall deadline
//! - Bound every suspending step by what is left of that deadline
//! - Cancel operations cleanly on expiry
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities; expiry drops the wrapped future
//! - Timeout errors are distinct from other errors
//! - Steps are not separately time-boxed; they share the one budget

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;

/// Raised when a step runs past the execution deadline.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("deadline of {budget:?} exceeded")]
pub struct DeadlineExceeded {
    pub budget: Duration,
}

/// A fixed point in time by which an execution must finish.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
    budget: Duration,
}

impl Deadline {
    /// A deadline `budget` from now.
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
            budget,
        }
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Time left before expiry (zero once passed).
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        self.remaining().is_zero()
    }

    /// The smaller of `limit` and the remaining budget.
    pub fn clamp(&self, limit: Duration) -> Duration {
        limit.min(self.remaining())
    }

    /// Run `fut` until it completes or the deadline passes.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, DeadlineExceeded> {
        tokio::time::timeout_at(self.at, fut)
            .await
            .map_err(|_| DeadlineExceeded {
                budget: self.budget,
            })
    }
}
