//! Configuration module for Scope-Harvest
//!
//! This module loads the TOML configuration file, merges command-line
//! overrides on top of it, and validates the result into one immutable
//! [`CrawlConfig`].
//!
//! # Example
//!
//! ```no_run
//! use scope_harvest::config::{load_config, CliOverrides};
//! use std::path::Path;
//!
//! let config = load_config(Some(Path::new("config.toml")), CliOverrides::default()).unwrap();
//! println!("Crawler will use max depth: {}", config.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CliOverrides, CrawlConfig, FetchConfig, FileConfig, FileTypePolicy, FileTypesSetting,
    OutputConfig, RunMode, UserAgentConfig, MAX_DEPTH_CEILING, WEB_PAGE_EXTENSIONS,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_file_config, resolve_config, split_list,
    DEFAULT_CONFIG_PATH,
};
