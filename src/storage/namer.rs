//! Flat file naming
//!
//! Maps a URL to a single path component and hands out collision-free
//! variants of it for one run.

use std::collections::{HashMap, HashSet};
use url::Url;

/// Longest file name produced, in bytes
pub const MAX_FILE_NAME_LEN: usize = 200;

/// Name used for directory-style URLs
const INDEX_NAME: &str = "index.html";

/// Longest suffix still treated as an extension
const MAX_EXTENSION_LEN: usize = 8;

/// Derives the flat file name for a URL
///
/// The host (with `_port` when one is present) and path are joined and every
/// path separator or other unsafe character becomes `_`. Query strings and
/// fragments are dropped. Directory-style paths get `index.html` appended.
///
/// Returns `None` for URLs without a host.
///
/// # Examples
///
/// ```
/// use scope_harvest::storage::name_for;
/// use url::Url;
///
/// let url = Url::parse("https://site.com/a/b/page.html?x=1").unwrap();
/// assert_eq!(name_for(&url).as_deref(), Some("site.com_a_b_page.html"));
///
/// let url = Url::parse("https://site.com/").unwrap();
/// assert_eq!(name_for(&url).as_deref(), Some("site.com_index.html"));
/// ```
pub fn name_for(url: &Url) -> Option<String> {
    let host = url.host_str()?;

    let mut raw = match url.port() {
        Some(port) => format!("{}_{}", host, port),
        None => host.to_string(),
    };
    raw.push_str(url.path());
    if raw.ends_with('/') {
        raw.push_str(INDEX_NAME);
    }

    let sanitized: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    // Keep the tail so the extension survives truncation
    let start = sanitized.len().saturating_sub(MAX_FILE_NAME_LEN);
    Some(sanitized[start..].to_string())
}

/// Splits a file name into stem and extension
///
/// Only a short alphanumeric suffix after the last dot counts as an
/// extension.
pub fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            (stem, Some(ext))
        }
        _ => (name, None),
    }
}

fn numbered(base: &str, n: u32) -> String {
    match split_extension(base) {
        (stem, Some(ext)) => format!("{}_{}.{}", stem, n, ext),
        (stem, None) => format!("{}_{}", stem, n),
    }
}

/// Hands out unique names within one run
///
/// The first request for `X.ext` gets `X.ext`; the Nth collision gets
/// `X_N.ext`. The same allocator drives both the writer and the dry-run
/// target list, so both produce identical names.
#[derive(Debug, Default)]
pub struct NameAllocator {
    /// Last suffix handed out per base name
    counters: HashMap<String, u32>,

    /// Every name handed out so far
    used: HashSet<String>,
}

impl NameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a name not handed out before
    pub fn allocate(&mut self, base: &str) -> String {
        self.allocate_avoiding(base, |_| false)
    }

    /// Returns a name not handed out before and for which `taken` is false
    pub fn allocate_avoiding<F>(&mut self, base: &str, taken: F) -> String
    where
        F: Fn(&str) -> bool,
    {
        if !self.used.contains(base) && !taken(base) {
            self.used.insert(base.to_string());
            return base.to_string();
        }

        let counter = self.counters.entry(base.to_string()).or_insert(0);
        loop {
            *counter += 1;
            let candidate = numbered(base, *counter);
            if !self.used.contains(&candidate) && !taken(&candidate) {
                self.used.insert(candidate.clone());
                return candidate;
            }
        }
    }

    /// Number of names handed out
    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }
}
