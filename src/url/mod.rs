//! URL handling module for Scope-Harvest
//!
//! This module provides URL normalization, public-suffix-aware domain
//! matching, blocked/whitelist matching, and the scope resolver that gives
//! every discovered URL its disposition.

mod domain;
mod matcher;
mod normalize;

use crate::config::CrawlConfig;
use crate::UrlError;
use std::fmt;
use url::Url;

// Re-export main functions
pub use domain::{extract_domain, is_internal, registrable_domain, RootDomain};
pub use matcher::{matches_external_entry, matches_prefix, matches_wildcard};
pub use normalize::{normalize_prefix, normalize_url, resolve_link};

/// Scope classification of a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeDecision {
    /// Matches a blocked path - never fetched
    Blocked,
    /// Same site - fetched and, if a page, expanded
    InternalExpandable,
    /// Whitelisted external - fetched but never expanded
    ExternalTerminal,
    /// Out of scope - dropped
    Ignored,
}

impl ScopeDecision {
    /// Returns true if a link with this decision may enter the frontier
    pub fn should_enqueue(&self) -> bool {
        matches!(self, Self::InternalExpandable | Self::ExternalTerminal)
    }

    /// Returns true if a page with this decision may be parsed for links
    pub fn is_expandable(&self) -> bool {
        matches!(self, Self::InternalExpandable)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blocked => "blocked",
            Self::InternalExpandable => "internal",
            Self::ExternalTerminal => "external",
            Self::Ignored => "ignored",
        }
    }
}

impl fmt::Display for ScopeDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies URLs against the run's scope rules
///
/// Rules are evaluated in strict priority order, first match wins:
/// 1. Blocked path prefix
/// 2. Internal (root domain, or allowed URL prefixes when configured)
/// 3. Whitelisted external entry
/// 4. Ignored
///
/// # Examples
///
/// ```no_run
/// use scope_harvest::config::CrawlConfig;
/// use scope_harvest::url::{ScopeDecision, ScopeResolver};
///
/// # fn example(config: &CrawlConfig) {
/// let resolver = ScopeResolver::new(config).unwrap();
/// match resolver.classify(&config.start_url) {
///     ScopeDecision::InternalExpandable => println!("Will crawl"),
///     ScopeDecision::ExternalTerminal => println!("Will fetch as a leaf"),
///     ScopeDecision::Blocked | ScopeDecision::Ignored => println!("Will skip"),
/// }
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ScopeResolver {
    root: RootDomain,
    blocked_paths: Vec<String>,
    allowed_external: Vec<String>,
    allowed_url_prefixes: Vec<String>,
}

impl ScopeResolver {
    /// Builds a resolver anchored on the start URL's root domain
    pub fn new(config: &CrawlConfig) -> Result<Self, UrlError> {
        let root = RootDomain::from_url(&config.start_url)?;
        Ok(Self::with_root(config, root))
    }

    /// Builds a resolver with an explicit root domain
    pub fn with_root(config: &CrawlConfig, root: RootDomain) -> Self {
        Self {
            root,
            blocked_paths: config.blocked_paths.clone(),
            allowed_external: config.allowed_external_domains.clone(),
            allowed_url_prefixes: config.allowed_url_prefixes.clone(),
        }
    }

    pub fn root(&self) -> &RootDomain {
        &self.root
    }

    /// Classifies a normalized URL
    pub fn classify(&self, url: &Url) -> ScopeDecision {
        // Priority 1: blocked paths
        if self
            .blocked_paths
            .iter()
            .any(|prefix| matches_prefix(prefix, url))
        {
            return ScopeDecision::Blocked;
        }

        // Priority 2: internal scope
        if self.is_in_internal_scope(url) {
            return ScopeDecision::InternalExpandable;
        }

        // Priority 3: whitelisted external
        if self
            .allowed_external
            .iter()
            .any(|entry| matches_external_entry(entry, url))
        {
            return ScopeDecision::ExternalTerminal;
        }

        ScopeDecision::Ignored
    }

    fn is_in_internal_scope(&self, url: &Url) -> bool {
        if self.allowed_url_prefixes.is_empty() {
            is_internal(url, &self.root)
        } else {
            self.allowed_url_prefixes
                .iter()
                .any(|prefix| matches_prefix(prefix, url))
        }
    }
}

/// Classifies a URL for a given configuration and root domain
pub fn classify_url(url: &Url, config: &CrawlConfig, root: &RootDomain) -> ScopeDecision {
    ScopeResolver::with_root(config, root.clone()).classify(url)
}
