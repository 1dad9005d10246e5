//! Output module for dry-run reports
//!
//! This module handles:
//! - Aggregating crawl records into statistics
//! - Building the crawl tree and download-target list
//! - Rendering and writing the markdown report

mod markdown;
mod report;
pub mod stats;

pub use markdown::{format_markdown_report, write_markdown_report};
pub use report::{render_tree, target_list, CrawlReport, ReportBuilder, ReportHeader, TargetEntry};
pub use stats::ReportStats;

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
