//! Statistics over crawl records
//!
//! This module aggregates the records of one run into the counts shown at
//! the top of the dry-run report.

use crate::state::{CrawlRecord, ResourceKind};
use std::collections::BTreeMap;

/// Label used for target files without an extension
pub const NO_EXTENSION: &str = "(none)";

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportStats {
    /// Total number of records
    pub total_records: usize,

    /// Successfully fetched pages
    pub pages: usize,

    /// Successfully fetched resources matching the file-type policy
    pub target_files: usize,

    /// Successfully fetched resources that are neither
    pub ignored: usize,

    /// Failed fetches
    pub errors: usize,

    /// Target files per lowercase extension
    pub files_by_extension: BTreeMap<String, usize>,

    /// Records per depth
    pub records_by_depth: BTreeMap<u32, usize>,
}

impl ReportStats {
    /// Computes statistics from records
    ///
    /// # Arguments
    ///
    /// * `records` - All records of one run
    ///
    /// # Returns
    ///
    /// The aggregated counts
    pub fn from_records(records: &[CrawlRecord]) -> Self {
        let mut stats = Self {
            total_records: records.len(),
            ..Self::default()
        };

        for record in records {
            *stats.records_by_depth.entry(record.depth).or_insert(0) += 1;

            if record.is_failure() {
                stats.errors += 1;
                continue;
            }

            match record.kind {
                ResourceKind::Page => stats.pages += 1,
                ResourceKind::Ignored => stats.ignored += 1,
                ResourceKind::File => {}
            }

            if record.target_file {
                stats.target_files += 1;
                let ext = record
                    .extension()
                    .unwrap_or_else(|| NO_EXTENSION.to_string());
                *stats.files_by_extension.entry(ext).or_insert(0) += 1;
            }
        }

        stats
    }

    /// Share of records that failed, in percent
    pub fn error_rate(&self) -> f64 {
        if self.total_records == 0 {
            0.0
        } else {
            (self.errors as f64 / self.total_records as f64) * 100.0
        }
    }
}
