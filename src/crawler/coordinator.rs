//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Seeding and draining the frontier in breadth-first order
//! - Enforcing the visited set and scope decisions before every fetch
//! - Classifying fetched resources and persisting target files
//! - Expanding eligible pages into new tasks
//!
//! Execution is strictly sequential: one fetch completes before the next
//! task is dequeued.

use crate::config::CrawlConfig;
use crate::crawler::content::{classify_content, ContentClass};
use crate::crawler::fetcher::{FetchedResource, Fetcher};
use crate::crawler::parser::LinkExtractor;
use crate::crawler::scheduler::{CrawlTask, Scheduler};
use crate::state::{CrawlRecord, Outcome, TaskState};
use crate::storage::Storage;
use crate::url::{normalize_url, resolve_link, RootDomain, ScopeDecision, ScopeResolver};
use crate::Result;
use std::collections::HashSet;
use std::future::Future;
use std::time::Instant;
use url::Url;

/// Tasks between progress log lines
const PROGRESS_INTERVAL: usize = 10;

/// Everything a finished crawl produced
#[derive(Debug)]
pub struct CrawlOutcome {
    /// One record per processed task, in processing order
    pub records: Vec<CrawlRecord>,

    /// Files persisted by the storage backend (always 0 for dry runs)
    pub files_written: usize,

    /// Root domain of the start URL
    pub root_domain: RootDomain,

    /// Number of fetcher invocations
    pub fetch_count: usize,

    /// The run stopped on a shutdown signal before the frontier drained
    pub interrupted: bool,
}

/// Main crawler coordinator structure
pub struct Coordinator<F, L> {
    config: CrawlConfig,
    resolver: ScopeResolver,
    scheduler: Scheduler,
    fetcher: F,
    extractor: L,
    storage: Option<Box<dyn Storage + Send>>,
    records: Vec<CrawlRecord>,
    fetch_count: usize,
}

impl<F, L> Coordinator<F, L>
where
    F: Fetcher,
    L: LinkExtractor,
{
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The resolved crawl configuration
    /// * `fetcher` - Collaborator used for every GET
    /// * `extractor` - Collaborator used to pull links from pages
    /// * `storage` - Backend for target files; ignored unless the run mode
    ///   is `full_run`
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Frontier seeded with the start URL
    /// * `Err(HarvestError)` - The start URL has no usable domain
    pub fn new(
        config: CrawlConfig,
        fetcher: F,
        extractor: L,
        storage: Option<Box<dyn Storage + Send>>,
    ) -> Result<Self> {
        let resolver = ScopeResolver::new(&config)?;

        let storage = if config.run_mode.is_dry_run() {
            if storage.is_some() {
                tracing::debug!("Dry run: storage backend disabled");
            }
            None
        } else {
            storage
        };

        let scheduler = Scheduler::new(vec![CrawlTask::seed(config.start_url.clone())]);

        Ok(Self {
            config,
            resolver,
            scheduler,
            fetcher,
            extractor,
            storage,
            records: Vec::new(),
            fetch_count: 0,
        })
    }

    /// Runs the main crawl loop until the frontier is empty
    ///
    /// Per-URL failures are recorded and never abort the loop; only storage
    /// errors (and internal state errors) end the run early.
    pub async fn run(self) -> Result<CrawlOutcome> {
        self.run_until(std::future::pending()).await
    }

    /// Runs the crawl loop until the frontier is empty or `shutdown` completes
    ///
    /// On shutdown the task in flight is abandoned and the records gathered
    /// so far are returned with `interrupted` set.
    pub async fn run_until<S>(mut self, shutdown: S) -> Result<CrawlOutcome>
    where
        S: Future<Output = ()>,
    {
        tracing::info!(
            "Starting crawl of {} (root domain {}, max depth {}, mode {})",
            self.config.start_url,
            self.resolver.root(),
            self.config.max_depth,
            self.config.run_mode
        );

        let mut processed = 0usize;
        let mut interrupted = false;
        let start_time = Instant::now();
        tokio::pin!(shutdown);

        while let Some(task) = self.scheduler.next_task() {
            tracing::debug!("Processing {} (depth {})", task.url, task.depth);
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    interrupted = true;
                    break;
                }
                result = self.process_task(task) => result?,
            }

            processed += 1;
            if processed % PROGRESS_INTERVAL == 0 {
                let rate = processed as f64 / start_time.elapsed().as_secs_f64().max(0.001);
                tracing::info!(
                    "Progress: {} tasks processed, {} in frontier, {:.2} tasks/sec",
                    processed,
                    self.scheduler.frontier_size(),
                    rate
                );
            }
        }

        if interrupted {
            tracing::warn!(
                "Crawl interrupted with {} tasks left in frontier",
                self.scheduler.frontier_size()
            );
        }

        let files_written = self.storage.as_ref().map_or(0, |s| s.files_written());

        tracing::info!(
            "Crawl completed: {} records, {} fetches, {} files written in {:?}",
            self.records.len(),
            self.fetch_count,
            files_written,
            start_time.elapsed()
        );

        Ok(CrawlOutcome {
            records: self.records,
            files_written,
            root_domain: self.resolver.root().clone(),
            fetch_count: self.fetch_count,
            interrupted,
        })
    }

    /// Processes a single task
    ///
    /// 1. Drops already-visited, blocked and ignored URLs without fetching
    /// 2. Marks the URL visited and fetches it
    /// 3. Records the result, persisting and expanding where allowed
    async fn process_task(&mut self, task: CrawlTask) -> Result<()> {
        let state = TaskState::Queued.advance(TaskState::Dequeued)?;

        if self.scheduler.is_visited(&task.url) {
            tracing::trace!("Already visited {}", task.url);
            state.advance(TaskState::Skipped)?;
            return Ok(());
        }

        let scope = self.resolver.classify(&task.url);
        if !scope.should_enqueue() {
            tracing::debug!("Skipping {} ({})", task.url, scope);
            state.advance(TaskState::Skipped)?;
            return Ok(());
        }

        self.scheduler.mark_visited(&task.url);
        self.fetch_count += 1;

        let fetched = self.fetcher.fetch(&task.url).await;
        match fetched {
            Ok(resource) => self.handle_fetched(task, scope, state, resource),
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", task.url, e);
                let class = classify_content(&task.url, None, &self.config.file_types);
                self.record_failure(task, scope, state, class, e.to_string())
            }
        }
    }

    fn handle_fetched(
        &mut self,
        task: CrawlTask,
        scope: ScopeDecision,
        state: TaskState,
        resource: FetchedResource,
    ) -> Result<()> {
        let final_url = normalize_url(resource.final_url.as_str())
            .unwrap_or_else(|_| resource.final_url.clone());

        let final_scope = if final_url == task.url {
            scope
        } else {
            tracing::debug!("{} redirected to {}", task.url, final_url);
            self.resolver.classify(&final_url)
        };

        let content_type = resource.content_type.as_deref();
        let class = classify_content(&final_url, content_type, &self.config.file_types);

        if final_scope == ScopeDecision::Blocked {
            tracing::warn!("{} redirected to blocked URL {}", task.url, final_url);
            let reason = format!("redirected to blocked URL {}", final_url);
            return self.record_failure(task, scope, state, class, reason);
        }

        // A redirect onto an already-fetched URL delivers the same resource again
        let duplicate = final_url != task.url && !self.scheduler.mark_visited(&final_url);
        if duplicate {
            tracing::debug!(
                "{} redirected to already visited {}, not persisting",
                task.url,
                final_url
            );
        }

        let state = state.advance(TaskState::Fetched)?;

        let persisted = match (&mut self.storage, class.is_target_file && !duplicate) {
            (Some(storage), true) => {
                storage.store(&final_url, &resource.body)?;
                true
            }
            _ => false,
        };

        let expand = class.is_page
            && !duplicate
            && task.depth < self.config.max_depth
            && scope.is_expandable()
            && final_scope.is_expandable();

        let (state, link_error) = if expand {
            let link_error = self.expand(&task, &final_url, &resource.body);
            (state.advance(TaskState::Expanded)?, link_error)
        } else {
            (state.advance(TaskState::Terminal)?, None)
        };

        self.records.push(CrawlRecord {
            url: task.url,
            final_url,
            depth: task.depth,
            parent_url: task.parent,
            scope,
            kind: class.kind(),
            target_file: class.is_target_file,
            persisted,
            content_type: resource.content_type,
            state,
            outcome: Outcome::Success,
            link_error,
        });

        Ok(())
    }

    /// Extracts links from a page and enqueues the in-scope ones
    ///
    /// Returns the link extraction error, if any; the page is then treated
    /// as having no links.
    fn expand(&mut self, task: &CrawlTask, base: &Url, body: &[u8]) -> Option<String> {
        let links = match self.extractor.extract_links(body, base) {
            Ok(links) => links,
            Err(e) => {
                tracing::warn!("Failed to extract links from {}: {}", base, e);
                return Some(e.to_string());
            }
        };

        let mut seen = HashSet::new();
        let mut enqueued = 0usize;

        for link in &links {
            let url = match resolve_link(base, link) {
                Ok(url) => url,
                Err(e) => {
                    tracing::debug!("Dropping link {}: {}", link, e);
                    continue;
                }
            };

            if !seen.insert(url.as_str().to_string()) {
                continue;
            }

            let decision = self.resolver.classify(&url);
            if !decision.should_enqueue() {
                tracing::debug!("Not enqueuing {} ({})", url, decision);
                continue;
            }

            let child = CrawlTask {
                url,
                depth: task.depth + 1,
                parent: Some(task.url.clone()),
            };
            if self.scheduler.add_to_frontier(child) {
                enqueued += 1;
            }
        }

        tracing::debug!(
            "Expanded {}: {} links, {} enqueued",
            base,
            links.len(),
            enqueued
        );
        None
    }

    fn record_failure(
        &mut self,
        task: CrawlTask,
        scope: ScopeDecision,
        state: TaskState,
        class: ContentClass,
        reason: String,
    ) -> Result<()> {
        let state = state.advance(TaskState::Failed)?;
        self.records.push(CrawlRecord {
            final_url: task.url.clone(),
            url: task.url,
            depth: task.depth,
            parent_url: task.parent,
            scope,
            kind: class.kind(),
            target_file: false,
            persisted: false,
            content_type: None,
            state,
            outcome: Outcome::Failure(reason),
            link_error: None,
        });
        Ok(())
    }
}
