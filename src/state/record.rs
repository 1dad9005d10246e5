use crate::state::TaskState;
use crate::url::ScopeDecision;
use std::fmt;
use url::Url;

/// What a processed resource turned out to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// A web page (parsed for links when allowed)
    Page,
    /// A non-page file of interest
    File,
    /// Neither a page nor a file of interest
    Ignored,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Page => "Page",
            Self::File => "File",
            Self::Ignored => "Ignored",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of processing one task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// One entry per processed task, appended once and never changed
///
/// Parent/child links through `parent_url` form the crawl tree used by the
/// dry-run report.
#[derive(Debug, Clone)]
pub struct CrawlRecord {
    /// Normalized URL that was dequeued
    pub url: Url,

    /// URL after redirects (same as `url` when the fetch failed)
    pub final_url: Url,

    pub depth: u32,

    /// Page on which this URL was first discovered (`None` for the start URL)
    pub parent_url: Option<Url>,

    pub scope: ScopeDecision,

    pub kind: ResourceKind,

    /// Matches the file-type policy, i.e. a full run persists it
    pub target_file: bool,

    /// Bytes were actually written to disk
    pub persisted: bool,

    pub content_type: Option<String>,

    /// Final task state (`Expanded`, `Terminal` or `Failed`)
    pub state: TaskState,

    pub outcome: Outcome,

    /// Link extraction failure on an expanded page (page still counts as fetched)
    pub link_error: Option<String>,
}

impl CrawlRecord {
    pub fn is_failure(&self) -> bool {
        !self.outcome.is_success()
    }

    /// Failure reason, if the task failed
    pub fn failure_reason(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Failure(reason) => Some(reason),
            Outcome::Success => None,
        }
    }

    /// Lowercase extension of the final URL's last path segment
    pub fn extension(&self) -> Option<String> {
        crate::crawler::url_extension(&self.final_url)
    }
}
