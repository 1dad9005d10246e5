use crate::config::types::{CliOverrides, CrawlConfig, FileConfig, FileTypePolicy, RunMode};
use crate::config::validation::{
    validate_blocked_paths, validate_external_entries, validate_fetch, validate_file_types,
    validate_max_depth, validate_start_url, validate_url_prefixes, validate_user_agent,
};
use crate::url::normalize_prefix;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Default configuration file looked up when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Reads and parses a TOML configuration file
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(FileConfig)` - Successfully parsed file
/// * `Err(ConfigError)` - Failed to read or parse the file
pub fn load_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: FileConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// The hash is shown in dry-run reports so two reports can be matched to
/// the configuration that produced them.
///
/// # Arguments
///
/// * `path` - Path to the configuration file
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&content);
    Ok(hex::encode(hasher.finalize()))
}

/// Loads, merges and validates the configuration for one run
///
/// When `path` is `None` the default `config.toml` is used if it exists;
/// a missing default file means the command line is the only source. A
/// missing explicit file is an error.
///
/// # Example
///
/// ```no_run
/// use scope_harvest::config::{load_config, CliOverrides};
///
/// let cli = CliOverrides {
///     start_url: Some("https://example.com".to_string()),
///     ..CliOverrides::default()
/// };
/// let config = load_config(None, cli).unwrap();
/// println!("Max depth: {}", config.max_depth);
/// ```
pub fn load_config(path: Option<&Path>, cli: CliOverrides) -> Result<CrawlConfig, ConfigError> {
    let (file, hash) = match path {
        Some(path) => (load_file_config(path)?, Some(compute_config_hash(path)?)),
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_PATH);
            if default_path.exists() {
                (
                    load_file_config(default_path)?,
                    Some(compute_config_hash(default_path)?),
                )
            } else {
                tracing::debug!(
                    "No {} found, using command-line values only",
                    DEFAULT_CONFIG_PATH
                );
                (FileConfig::default(), None)
            }
        }
    };

    resolve_config(file, cli, hash)
}

/// Merges file values and command-line overrides into one validated config
///
/// Precedence for every field is CLI > file > built-in default.
pub fn resolve_config(
    file: FileConfig,
    cli: CliOverrides,
    config_hash: Option<String>,
) -> Result<CrawlConfig, ConfigError> {
    let start_url = validate_start_url(cli.start_url.as_deref().or(file.start_url.as_deref()))?;

    let max_depth = validate_max_depth(cli.max_depth.or(file.max_depth).unwrap_or(0))?;

    let file_types = match (&cli.file_types, &file.file_types) {
        (Some(raw), _) => FileTypePolicy::parse(raw),
        (None, Some(setting)) => FileTypePolicy::from_setting(setting),
        (None, None) => FileTypePolicy::All,
    };
    validate_file_types(&file_types)?;

    let blocked_paths = canonical_prefixes(
        cli.blocked_paths
            .or(file.blocked_paths)
            .unwrap_or_default(),
    );
    validate_blocked_paths(&blocked_paths)?;

    let allowed_external_domains = dedup_preserving_order(
        cli.allowed_external
            .or(file.allowed_external_domains)
            .unwrap_or_default(),
    );
    validate_external_entries(&allowed_external_domains)?;

    let allowed_url_prefixes = canonical_prefixes(
        cli.allowed_url_prefixes
            .or(file.allowed_url_prefixes)
            .unwrap_or_default(),
    );
    validate_url_prefixes(&allowed_url_prefixes)?;

    let run_mode = cli.run_mode.or(file.run_mode).unwrap_or(RunMode::DryRun);

    let user_agent = file.user_agent.unwrap_or_default();
    validate_user_agent(&user_agent)?;

    let fetch = file.fetch.unwrap_or_default();
    validate_fetch(&fetch)?;

    Ok(CrawlConfig {
        start_url,
        max_depth,
        file_types,
        blocked_paths,
        allowed_external_domains,
        allowed_url_prefixes,
        run_mode,
        user_agent,
        output: file.output.unwrap_or_default(),
        fetch,
        config_hash,
    })
}

/// Splits a comma-separated command-line value into trimmed, non-empty items
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Normalizes prefix entries like crawled URLs, then removes duplicates
fn canonical_prefixes(items: Vec<String>) -> Vec<String> {
    dedup_preserving_order(items.iter().map(|item| normalize_prefix(item)).collect())
}

fn dedup_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let item = item.trim().to_string();
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}
