//! State tracking for crawl tasks
//!
//! This module contains the per-task state machine and the records the
//! coordinator appends for every processed task.

mod record;
mod task_state;

pub use record::{CrawlRecord, Outcome, ResourceKind};
pub use task_state::TaskState;
