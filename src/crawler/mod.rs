//! Crawler module for fetching, classifying and expanding resources
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the [`Fetcher`] trait
//! - HTML link extraction behind the [`LinkExtractor`] trait
//! - Content classification (page vs. target file)
//! - Breadth-first scheduling and overall crawl coordination

mod content;
mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use content::{classify_content, is_web_extension, url_extension, ContentClass};
pub use coordinator::{Coordinator, CrawlOutcome};
pub use fetcher::{
    build_http_client, user_agent_string, FetchError, FetchedResource, Fetcher, HttpFetcher,
    MAX_REDIRECTS,
};
pub use parser::{extract_links, HtmlLinkExtractor, LinkExtractor, ParseError};
pub use scheduler::{CrawlTask, Scheduler};

use crate::config::{CrawlConfig, RunMode};
use crate::output::{write_markdown_report, ReportBuilder};
use crate::state::CrawlRecord;
use crate::storage::{FlatDirectoryStorage, Storage};
use crate::Result;
use std::future::Future;
use std::path::PathBuf;

/// Format of the run timestamp used in directory and report names
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// What a completed run produced
#[derive(Debug)]
pub struct RunSummary {
    /// Every processed record, in processing order
    pub records: Vec<CrawlRecord>,

    /// Records whose fetch failed
    pub failures: usize,

    /// Files written to disk (0 for dry runs)
    pub files_written: usize,

    /// Report file for dry runs, snapshot directory for full runs
    pub artifact: PathBuf,

    /// The run was stopped by a shutdown signal
    pub interrupted: bool,
}

/// Returns the current local time formatted for artifact names
pub fn run_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Runs a complete crawl with the default HTTP and HTML collaborators
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client from the configuration
/// 2. Create the snapshot directory (full runs only)
/// 3. Crawl the site breadth-first
/// 4. Write the dry-run report (dry runs only)
///
/// Ctrl-C stops the crawl early; a dry run still writes its report from
/// the records gathered up to that point.
///
/// # Example
///
/// ```no_run
/// use scope_harvest::config::{load_config, CliOverrides};
/// use scope_harvest::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(None, CliOverrides::default())?;
/// let summary = run_crawl(config).await?;
/// println!("{} records", summary.records.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: CrawlConfig) -> Result<RunSummary> {
    let fetcher = HttpFetcher::from_config(&config.user_agent, &config.fetch)?;
    run_with_shutdown(
        config,
        fetcher,
        HtmlLinkExtractor,
        &run_timestamp(),
        shutdown_signal(),
    )
    .await
}

/// Completes on Ctrl-C; never completes if the signal cannot be watched
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(err) => {
            tracing::error!("Unable to listen for shutdown signal: {}", err);
            std::future::pending::<()>().await;
        }
    }
}

/// Runs a crawl with explicit collaborators and timestamp
///
/// # Arguments
///
/// * `config` - The resolved crawl configuration
/// * `fetcher` - Fetch collaborator
/// * `extractor` - Link extraction collaborator
/// * `timestamp` - Names the snapshot directory or report file
pub async fn run_with<F, L>(
    config: CrawlConfig,
    fetcher: F,
    extractor: L,
    timestamp: &str,
) -> Result<RunSummary>
where
    F: Fetcher,
    L: LinkExtractor,
{
    run_with_shutdown(config, fetcher, extractor, timestamp, std::future::pending()).await
}

/// Like [`run_with`], stopping early when `shutdown` completes
///
/// Whatever was gathered before the shutdown is still reported: dry runs
/// write a report marked as interrupted, full runs keep the files written.
pub async fn run_with_shutdown<F, L, S>(
    config: CrawlConfig,
    fetcher: F,
    extractor: L,
    timestamp: &str,
    shutdown: S,
) -> Result<RunSummary>
where
    F: Fetcher,
    L: LinkExtractor,
    S: Future<Output = ()>,
{
    let export_dir = config.output.export_dir.clone();

    let (storage, artifact): (Option<Box<dyn Storage + Send>>, PathBuf) = match config.run_mode {
        RunMode::FullRun => {
            let storage = FlatDirectoryStorage::create(&export_dir, timestamp)?;
            let dir = storage.dir().to_path_buf();
            let storage: Box<dyn Storage + Send> = Box::new(storage);
            (Some(storage), dir)
        }
        RunMode::DryRun | RunMode::DryRunErrors => (
            None,
            export_dir.join(format!("dry_run_{}.md", timestamp)),
        ),
    };

    let coordinator = Coordinator::new(config.clone(), fetcher, extractor, storage)?;
    let outcome = coordinator.run_until(shutdown).await?;

    if config.run_mode.is_dry_run() {
        let report = ReportBuilder::new(&config, &outcome.root_domain, timestamp)
            .interrupted(outcome.interrupted)
            .build(&outcome.records);
        write_markdown_report(&report, &artifact)?;
        tracing::info!("Report written to {}", artifact.display());
    }

    let failures = outcome.records.iter().filter(|r| r.is_failure()).count();

    Ok(RunSummary {
        records: outcome.records,
        failures,
        files_written: outcome.files_written,
        artifact,
        interrupted: outcome.interrupted,
    })
}
