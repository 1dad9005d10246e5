/// Task state definitions for tracking crawl progress
///
/// Every dequeued task walks a small state machine; the final state ends up
/// in the task's [`CrawlRecord`](crate::state::CrawlRecord).
use crate::HarvestError;
use std::fmt;

/// Represents the current state of a crawl task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    // ===== Active States =====
    /// Task is waiting in the frontier
    Queued,

    /// Task has been taken off the frontier
    Dequeued,

    /// Resource was fetched and classified
    Fetched,

    // ===== Final States =====
    /// Task was dropped without fetching (already visited or blocked)
    Skipped,

    /// Fetch failed or the redirect target was out of bounds
    Failed,

    /// Page was parsed and its links offered to the frontier
    Expanded,

    /// Resource was fetched but not expanded
    Terminal,
}

impl TaskState {
    /// Returns true if this state is final (no further transitions)
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            Self::Skipped | Self::Failed | Self::Expanded | Self::Terminal
        )
    }

    /// Returns true if the state machine allows moving to `next`
    pub fn can_transition_to(&self, next: TaskState) -> bool {
        matches!(
            (self, next),
            (Self::Queued, Self::Dequeued)
                | (Self::Dequeued, Self::Skipped)
                | (Self::Dequeued, Self::Fetched)
                | (Self::Dequeued, Self::Failed)
                | (Self::Fetched, Self::Expanded)
                | (Self::Fetched, Self::Terminal)
        )
    }

    /// Moves to `next`, or fails with `InvalidTransition`
    pub fn advance(self, next: TaskState) -> Result<TaskState, HarvestError> {
        if self.can_transition_to(next) {
            tracing::trace!("task state {} -> {}", self, next);
            Ok(next)
        } else {
            Err(HarvestError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Dequeued => "dequeued",
            Self::Fetched => "fetched",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
            Self::Expanded => "expanded",
            Self::Terminal => "terminal",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
