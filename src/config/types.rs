use serde::Deserialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use url::Url;

/// Hard ceiling for `max_depth`
pub const MAX_DEPTH_CEILING: u32 = 10;

/// Extensions that identify a web page (parsed for links)
pub const WEB_PAGE_EXTENSIONS: &[&str] = &["html", "htm", "php", "asp", "jsp", "aspx"];

/// Configuration as read from the TOML file
///
/// Every crawl field is optional here; missing values are filled from the
/// command line or from built-in defaults during resolution.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub start_url: Option<String>,

    /// Signed so that negative values surface as validation errors
    pub max_depth: Option<i64>,

    pub file_types: Option<FileTypesSetting>,

    pub blocked_paths: Option<Vec<String>>,

    pub allowed_external_domains: Option<Vec<String>>,

    pub allowed_url_prefixes: Option<Vec<String>>,

    pub run_mode: Option<RunMode>,

    #[serde(rename = "user-agent")]
    pub user_agent: Option<UserAgentConfig>,

    pub output: Option<OutputConfig>,

    pub fetch: Option<FetchConfig>,
}

/// Raw `file_types` value: a keyword / comma string, or an array
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FileTypesSetting {
    Text(String),
    List(Vec<String>),
}

/// Values supplied on the command line; each one overrides the file
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub start_url: Option<String>,
    pub max_depth: Option<i64>,
    pub file_types: Option<String>,
    pub blocked_paths: Option<Vec<String>>,
    pub allowed_external: Option<Vec<String>>,
    pub allowed_url_prefixes: Option<Vec<String>>,
    pub run_mode: Option<RunMode>,
}

/// Execution mode of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Simulate the crawl and write a report
    DryRun,
    /// Like `DryRun`, with failed fetches inlined in the report tree
    DryRunErrors,
    /// Download target files into the snapshot directory
    FullRun,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DryRun => "dry_run",
            Self::DryRunErrors => "dry_run_errors",
            Self::FullRun => "full_run",
        }
    }

    /// Returns true for both dry-run variants
    pub fn is_dry_run(&self) -> bool {
        matches!(self, Self::DryRun | Self::DryRunErrors)
    }

    /// Returns true if absorbed failures must appear in the report
    pub fn shows_errors(&self) -> bool {
        matches!(self, Self::DryRunErrors)
    }
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "dry_run" => Ok(Self::DryRun),
            "dry_run_errors" => Ok(Self::DryRunErrors),
            "full_run" => Ok(Self::FullRun),
            other => Err(format!(
                "unknown run mode '{}' (expected dry_run, dry_run_errors or full_run)",
                other
            )),
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which fetched resources count as files of interest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileTypePolicy {
    /// Every fetched resource
    All,
    /// Web pages only (web extensions or extensionless paths)
    WebPreset,
    /// Resources whose lowercase extension is in the set
    CustomSet(BTreeSet<String>),
}

impl FileTypePolicy {
    /// Normalizes a command-line or config string
    ///
    /// `"all"` and `"web"` are keywords; anything else is a comma-separated
    /// list of extensions (leading dots and case are ignored).
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "all" => Self::All,
            "web" => Self::WebPreset,
            _ => Self::from_extensions(raw.split(',')),
        }
    }

    /// Builds a custom set from individual extension strings
    pub fn from_extensions<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = items
            .into_iter()
            .map(|item| item.as_ref().trim().trim_start_matches('.').to_lowercase())
            .filter(|item| !item.is_empty())
            .collect();
        Self::CustomSet(set)
    }

    pub(crate) fn from_setting(setting: &FileTypesSetting) -> Self {
        match setting {
            FileTypesSetting::Text(raw) => Self::parse(raw),
            FileTypesSetting::List(items) => Self::from_extensions(items),
        }
    }
}

impl fmt::Display for FileTypePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::WebPreset => f.write_str("web"),
            Self::CustomSet(set) => {
                let joined: Vec<&str> = set.iter().map(String::as_str).collect();
                f.write_str(&joined.join(","))
            }
        }
    }
}

/// User agent identification
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler (optional)
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "scope-harvest".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: String::new(),
        }
    }
}

/// Output location
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory for snapshots and reports
    #[serde(rename = "export-dir")]
    pub export_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            export_dir: PathBuf::from("Export"),
        }
    }
}

/// HTTP fetch behaviour
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-request timeout in seconds
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout_secs: 15 }
    }
}

/// Fully resolved configuration for one run
///
/// Built once by [`resolve_config`](crate::config::resolve_config) and
/// read-only afterwards.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Normalized start URL
    pub start_url: Url,

    /// Maximum traversal depth, `0..=MAX_DEPTH_CEILING`
    pub max_depth: u32,

    pub file_types: FileTypePolicy,

    /// URL prefixes that are never fetched, in configuration order
    pub blocked_paths: Vec<String>,

    /// Whitelisted external domains or URL prefixes
    pub allowed_external_domains: Vec<String>,

    /// When non-empty, replaces the root-domain test for internal scope
    pub allowed_url_prefixes: Vec<String>,

    pub run_mode: RunMode,

    pub user_agent: UserAgentConfig,

    pub output: OutputConfig,

    pub fetch: FetchConfig,

    /// SHA-256 of the config file, when one was loaded
    pub config_hash: Option<String>,
}
