//! Execution state machine.
//!
//! ```text
//! Start → ConfigLookup ─┬→ Transform → Invoke ─┬→ Done
//!                       └→ Failed              └→ Failed
//! ```

use serde::Serialize;

/// Pipeline position of one execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ExecutionState {
    Start,
    ConfigLookup,
    Transform,
    Invoke,
    Done,
    Failed,
}

impl ExecutionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExecutionState::Done | ExecutionState::Failed)
    }

    /// Whether `next` is a legal successor of `self`.
    pub fn can_transition_to(&self, next: ExecutionState) -> bool {
        use ExecutionState::*;
        matches!(
            (self, next),
            (Start, ConfigLookup)
                | (ConfigLookup, Transform)
                | (ConfigLookup, Failed)
                | (Transform, Invoke)
                | (Invoke, Done)
                | (Invoke, Failed)
        )
    }
}

/// Forward-only walk through [`ExecutionState`], recording the path taken.
#[derive(Debug, Clone)]
pub struct StateTracker {
    path: Vec<ExecutionState>,
}

impl StateTracker {
    pub fn new() -> Self {
        Self {
            path: vec![ExecutionState::Start],
        }
    }

    pub fn current(&self) -> ExecutionState {
        // `path` always holds at least `Start`.
        self.path.last().copied().unwrap_or(ExecutionState::Start)
    }

    /// Move to `next`. Illegal moves are refused and logged.
    pub fn advance(&mut self, next: ExecutionState) -> bool {
        let current = self.current();
        if !current.can_transition_to(next) {
            tracing::error!(from = ?current, to = ?next, "Illegal execution state transition");
            debug_assert!(false, "illegal transition {:?} -> {:?}", current, next);
            return false;
        }
        tracing::trace!(from = ?current, to = ?next, "Execution state transition");
        self.path.push(next);
        true
    }

    pub fn into_path(self) -> Vec<ExecutionState> {
        self.path
    }
}

impl Default for StateTracker {
    fn default() -> Self {
        Self::new()
    }
}
