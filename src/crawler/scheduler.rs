//! Scheduler for managing the crawl frontier and the visited set
//!
//! This module handles:
//! - FIFO frontier queue (breadth-first order)
//! - Visited-set bookkeeping so each URL is fetched at most once
//! - Queued-set bookkeeping so each URL sits in the frontier at most once

use std::collections::{HashSet, VecDeque};
use url::Url;

/// A URL queued for fetching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    /// Normalized absolute URL
    pub url: Url,

    /// Distance from the start URL
    pub depth: u32,

    /// Page the URL was discovered on
    pub parent: Option<Url>,
}

impl CrawlTask {
    /// The depth-0 task for the start URL
    pub fn seed(url: Url) -> Self {
        Self {
            url,
            depth: 0,
            parent: None,
        }
    }
}

/// Scheduler owns the frontier and the visited set
///
/// Tasks are handed out in insertion order, so every depth-`d` task is
/// processed before any depth-`d+1` task.
#[derive(Debug, Default)]
pub struct Scheduler {
    /// Frontier queue of tasks to process
    frontier: VecDeque<CrawlTask>,

    /// Normalized URLs already dequeued and processed
    visited: HashSet<String>,

    /// Normalized URLs ever pushed onto the frontier
    queued: HashSet<String>,
}

impl Scheduler {
    /// Creates a new scheduler
    ///
    /// # Arguments
    ///
    /// * `initial_frontier` - Initial tasks to crawl, in order
    pub fn new(initial_frontier: Vec<CrawlTask>) -> Self {
        let queued = initial_frontier
            .iter()
            .map(|task| task.url.as_str().to_string())
            .collect();
        Self {
            frontier: initial_frontier.into(),
            visited: HashSet::new(),
            queued,
        }
    }

    /// Takes the oldest task off the frontier
    pub fn next_task(&mut self) -> Option<CrawlTask> {
        self.frontier.pop_front()
    }

    /// Adds a task to the back of the frontier
    ///
    /// Returns false (and drops the task) if its URL was already visited
    /// or queued. The first discovery wins, so depth and parent come from
    /// the earliest linking page.
    pub fn add_to_frontier(&mut self, task: CrawlTask) -> bool {
        if self.is_visited(&task.url) || !self.queued.insert(task.url.as_str().to_string()) {
            return false;
        }
        self.frontier.push_back(task);
        true
    }

    /// Marks a URL as visited
    ///
    /// Returns true if the URL was not visited before.
    pub fn mark_visited(&mut self, url: &Url) -> bool {
        self.visited.insert(url.as_str().to_string())
    }

    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(url.as_str())
    }

    /// Returns the number of tasks in the frontier
    pub fn frontier_size(&self) -> usize {
        self.frontier.len()
    }

    /// Returns whether the frontier is empty
    pub fn is_empty(&self) -> bool {
        self.frontier.is_empty()
    }

    /// Returns the number of visited URLs
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
