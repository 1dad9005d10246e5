//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use std::path::PathBuf;
use thiserror::Error;
use url::Url;

/// Errors that can occur during storage operations
///
/// Every variant is fatal for a full run: the run aborts rather than
/// silently dropping files.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Output directory {0} already exists")]
    RunDirExists(PathBuf),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot derive a file name from URL: {0}")]
    InvalidName(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// A backend receives the bytes of every target file in crawl order and
/// must never overwrite a file it wrote earlier in the same run.
pub trait Storage {
    /// Persists one fetched resource
    ///
    /// # Arguments
    ///
    /// * `url` - The URL the bytes were fetched from (after redirects)
    /// * `body` - The raw response body
    ///
    /// # Returns
    ///
    /// The path the bytes were written to
    fn store(&mut self, url: &Url, body: &[u8]) -> StorageResult<PathBuf>;

    /// Number of files written so far
    fn files_written(&self) -> usize;
}
