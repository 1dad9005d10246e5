//! Dry-run report construction
//!
//! Turns the records of one run into a header, statistics, a parent/child
//! crawl tree and the list of files a full run would write.

use crate::config::{CrawlConfig, RunMode};
use crate::output::stats::ReportStats;
use crate::state::CrawlRecord;
use crate::storage::{name_for, NameAllocator};
use crate::url::{RootDomain, ScopeDecision};
use std::collections::{HashMap, HashSet};

/// Run metadata shown at the top of the report
#[derive(Debug, Clone)]
pub struct ReportHeader {
    pub timestamp: String,
    pub start_url: String,
    pub root_domain: String,
    pub max_depth: u32,
    pub file_types: String,
    pub run_mode: RunMode,
    pub config_hash: Option<String>,
    /// The crawl was stopped before the frontier drained
    pub interrupted: bool,
}

/// A file a full run would write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetEntry {
    /// URL the bytes would come from (after redirects)
    pub url: String,

    /// Flat file name, collision suffix included
    pub file_name: String,
}

/// Everything rendered into a dry-run report
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub header: ReportHeader,
    pub stats: ReportStats,
    /// Rendered tree, one node per line
    pub tree: Vec<String>,
    pub targets: Vec<TargetEntry>,
}

/// Builds a [`CrawlReport`] from crawl records
///
/// # Example
///
/// ```no_run
/// use scope_harvest::output::ReportBuilder;
/// # fn example(config: &scope_harvest::CrawlConfig, root: &scope_harvest::RootDomain) {
/// let report = ReportBuilder::new(config, root, "2024-01-01_00-00-00").build(&[]);
/// assert!(report.targets.is_empty());
/// # }
/// ```
pub struct ReportBuilder<'a> {
    config: &'a CrawlConfig,
    root_domain: &'a RootDomain,
    timestamp: &'a str,
    interrupted: bool,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(config: &'a CrawlConfig, root_domain: &'a RootDomain, timestamp: &'a str) -> Self {
        Self {
            config,
            root_domain,
            timestamp,
            interrupted: false,
        }
    }

    /// Marks the report as covering a partial crawl
    pub fn interrupted(mut self, interrupted: bool) -> Self {
        self.interrupted = interrupted;
        self
    }

    pub fn build(&self, records: &[CrawlRecord]) -> CrawlReport {
        let header = ReportHeader {
            timestamp: self.timestamp.to_string(),
            start_url: self.config.start_url.to_string(),
            root_domain: self.root_domain.to_string(),
            max_depth: self.config.max_depth,
            file_types: self.config.file_types.to_string(),
            run_mode: self.config.run_mode,
            config_hash: self.config.config_hash.clone(),
            interrupted: self.interrupted,
        };

        CrawlReport {
            header,
            stats: ReportStats::from_records(records),
            tree: render_tree(records, self.config.run_mode.shows_errors()),
            targets: target_list(records),
        }
    }
}

/// Lists what a full run would write, named exactly as the writer would
///
/// The writer sees target files in record order, so allocating names in
/// the same order reproduces its collision suffixes. A redirect onto a URL
/// that was already fetched is not written twice.
pub fn target_list(records: &[CrawlRecord]) -> Vec<TargetEntry> {
    let mut allocator = NameAllocator::new();
    let mut seen: HashSet<String> = HashSet::new();

    records
        .iter()
        .filter(|r| r.target_file && !r.is_failure())
        .filter(|r| seen.insert(r.final_url.to_string()))
        .filter_map(|r| {
            let base = name_for(&r.final_url)?;
            Some(TargetEntry {
                url: r.final_url.to_string(),
                file_name: allocator.allocate(&base),
            })
        })
        .collect()
}

/// Renders records as an indented tree keyed by parent URL
///
/// Failed records only appear when `show_errors` is set; they are shown as
/// leaves annotated with the failure reason.
pub fn render_tree(records: &[CrawlRecord], show_errors: bool) -> Vec<String> {
    let visible: Vec<&CrawlRecord> = records
        .iter()
        .filter(|r| show_errors || !r.is_failure())
        .collect();

    let mut children: HashMap<&str, Vec<&CrawlRecord>> = HashMap::new();
    let mut roots = Vec::new();
    for &record in &visible {
        match &record.parent_url {
            Some(parent) => children.entry(parent.as_str()).or_default().push(record),
            None => roots.push(record),
        }
    }

    let mut lines = Vec::new();
    for root in roots {
        lines.push(node_label(root, show_errors));
        render_children(root, &children, "", show_errors, &mut lines);
    }
    lines
}

fn render_children(
    parent: &CrawlRecord,
    children: &HashMap<&str, Vec<&CrawlRecord>>,
    prefix: &str,
    show_errors: bool,
    lines: &mut Vec<String>,
) {
    let Some(kids) = children.get(parent.url.as_str()) else {
        return;
    };

    for (i, child) in kids.iter().enumerate() {
        let last = i + 1 == kids.len();
        let (branch, indent) = if last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };
        lines.push(format!("{}{}{}", prefix, branch, node_label(child, show_errors)));
        let next_prefix = format!("{}{}", prefix, indent);
        render_children(child, children, &next_prefix, show_errors, lines);
    }
}

fn node_label(record: &CrawlRecord, show_errors: bool) -> String {
    let mut label = record.url.to_string();

    if let Some(reason) = record.failure_reason() {
        label.push_str(&format!(" [Error: {}] ({})", reason, record.state));
        return label;
    }

    if record.final_url != record.url {
        label.push_str(&format!(" -> {}", record.final_url));
    }
    label.push_str(&format!(" [{}]", record.kind));
    if record.scope == ScopeDecision::ExternalTerminal {
        label.push_str(" (external)");
    }
    label.push_str(&format!(" ({})", record.state));
    if record.target_file {
        label.push_str(" *");
    }
    if show_errors {
        if let Some(err) = &record.link_error {
            label.push_str(&format!(" [Links unreadable: {}]", err));
        }
    }
    label
}
