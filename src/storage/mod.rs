//! Storage module for persisting harvested files
//!
//! This module handles everything a full run writes to disk:
//! - Deterministic URL to file name mapping
//! - Per-run collision counters
//! - Flat, non-overwriting writes into the run directory

mod flat;
mod namer;
mod traits;

pub use flat::FlatDirectoryStorage;
pub use namer::{name_for, split_extension, NameAllocator, MAX_FILE_NAME_LEN};
pub use traits::{Storage, StorageError, StorageResult};
