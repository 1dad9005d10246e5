//! Markdown report generation
//!
//! This module renders a [`CrawlReport`] as the human-readable dry-run
//! artifact.

use crate::output::report::CrawlReport;
use crate::output::OutputResult;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Writes a markdown report to disk
///
/// Parent directories are created as needed.
///
/// # Arguments
///
/// * `report` - The built report
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the report
/// * `Err(OutputError)` - Failed to write the report
pub fn write_markdown_report(report: &CrawlReport, output_path: &Path) -> OutputResult<()> {
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let markdown = format_markdown_report(report);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a report as markdown
pub fn format_markdown_report(report: &CrawlReport) -> String {
    let mut md = String::new();
    let header = &report.header;
    let stats = &report.stats;

    // Title
    md.push_str("# Scope-Harvest Dry Run Report\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Timestamp**: {}\n", header.timestamp));
    md.push_str(&format!("- **Start URL**: {}\n", header.start_url));
    md.push_str(&format!("- **Root Domain**: {}\n", header.root_domain));
    md.push_str(&format!("- **Max Depth**: {}\n", header.max_depth));
    md.push_str(&format!("- **File Types**: {}\n", header.file_types));
    md.push_str(&format!("- **Run Mode**: {}\n", header.run_mode));
    if let Some(hash) = &header.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    if header.interrupted {
        md.push_str("- **Status**: interrupted, partial results\n");
    }
    md.push('\n');

    // Overall statistics
    md.push_str("## Statistics\n\n");
    md.push_str(&format!("- **Records**: {}\n", stats.total_records));
    md.push_str(&format!("- **Pages Found**: {}\n", stats.pages));
    md.push_str(&format!("- **Target Files**: {}\n", stats.target_files));
    md.push_str(&format!("- **Ignored**: {}\n", stats.ignored));
    md.push_str(&format!(
        "- **Errors**: {} ({:.2}%)\n\n",
        stats.errors,
        stats.error_rate()
    ));

    if !stats.files_by_extension.is_empty() {
        md.push_str("### Target Files by Extension\n\n");
        md.push_str("| Extension | Count |\n");
        md.push_str("|-----------|-------|\n");
        for (ext, count) in &stats.files_by_extension {
            md.push_str(&format!("| {} | {} |\n", ext, count));
        }
        md.push('\n');
    }

    if !stats.records_by_depth.is_empty() {
        md.push_str("### Records by Depth\n\n");
        md.push_str("| Depth | Records |\n");
        md.push_str("|-------|---------|\n");
        for (depth, count) in &stats.records_by_depth {
            md.push_str(&format!("| {} | {} |\n", depth, count));
        }
        md.push('\n');
    }

    // Crawl tree
    md.push_str("## Crawl Tree\n\n");
    md.push_str("Entries marked `*` would be downloaded by a full run.\n\n");
    md.push_str("```text\n");
    for line in &report.tree {
        md.push_str(line);
        md.push('\n');
    }
    md.push_str("```\n\n");

    // Download targets
    md.push_str("## Download Targets\n\n");
    if report.targets.is_empty() {
        md.push_str("No files would be downloaded.\n");
    } else {
        md.push_str("| # | URL | File Name |\n");
        md.push_str("|---|-----|-----------|\n");
        for (i, target) in report.targets.iter().enumerate() {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                i + 1,
                target.url,
                target.file_name
            ));
        }
    }

    md
}
