//! Scope-Harvest main entry point
//!
//! This is the command-line interface for the Scope-Harvest site harvester.

use anyhow::Context;
use clap::{Parser, Subcommand};
use scope_harvest::cleaner::{clean_directory, resolve_source, DEFAULT_SOURCE_DIR};
use scope_harvest::config::{
    load_config, load_file_config, split_list, CliOverrides, OutputConfig, RunMode,
    DEFAULT_CONFIG_PATH,
};
use scope_harvest::crawler::{run_crawl, run_timestamp};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Scope-Harvest: a bounded, domain-scoped site harvester
///
/// Scope-Harvest crawls a site breadth-first from a start URL, stays inside
/// its registrable domain (plus whitelisted external sources), and either
/// downloads matching files or writes a dry-run report of what it would
/// download. Every flag overrides the matching config file value.
///
/// The `clean` subcommand reduces saved HTML pages to their readable content.
#[derive(Parser, Debug)]
#[command(name = "scope-harvest")]
#[command(version)]
#[command(about = "A bounded, domain-scoped site harvester", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to TOML configuration file [default: config.toml, if present]
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// URL the crawl starts from
    #[arg(long = "start_url", value_name = "URL")]
    start_url: Option<String>,

    /// Maximum link depth from the start URL (0-10)
    #[arg(long = "max_depth", value_name = "N", allow_negative_numbers = true)]
    max_depth: Option<i64>,

    /// "all", "web", or a comma-separated list of extensions
    #[arg(long = "file_types", value_name = "TYPES")]
    file_types: Option<String>,

    /// Comma-separated URL prefixes that are never fetched
    #[arg(long = "blocked_paths", value_name = "PREFIXES")]
    blocked_paths: Option<String>,

    /// Comma-separated external domains or URL prefixes to download from
    #[arg(long = "allowed_external", value_name = "DOMAINS")]
    allowed_external: Option<String>,

    /// Comma-separated URL prefixes that replace the root-domain scope
    #[arg(long = "allowed_url_prefixes", value_name = "PREFIXES")]
    allowed_url_prefixes: Option<String>,

    /// dry_run, dry_run_errors or full_run
    #[arg(long = "run_mode", value_name = "MODE")]
    run_mode: Option<RunMode>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reduce saved HTML pages to their readable content
    ///
    /// The first page in each directory keeps its full structure (headers,
    /// navigation, footers); the others keep only their main content.
    Clean {
        /// Directory of .html files [default: source/, or the path named in
        /// source/source_path.txt]
        #[arg(long, value_name = "DIR")]
        source: Option<PathBuf>,

        /// Root directory for cleaned output [default: the config's export-dir]
        #[arg(long = "export_dir", value_name = "DIR")]
        export_dir: Option<PathBuf>,
    },
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            start_url: self.start_url.clone(),
            max_depth: self.max_depth,
            file_types: self.file_types.clone(),
            blocked_paths: self.blocked_paths.as_deref().map(split_list),
            allowed_external: self.allowed_external.as_deref().map(split_list),
            allowed_url_prefixes: self.allowed_url_prefixes.as_deref().map(split_list),
            run_mode: self.run_mode,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    if let Some(Command::Clean { source, export_dir }) = &cli.command {
        return clean(cli.config.as_deref(), source.as_deref(), export_dir.clone());
    }

    // Load and validate configuration
    let config = load_config(cli.config.as_deref(), cli.overrides())
        .context("Failed to load configuration")?;

    if let Some(hash) = &config.config_hash {
        tracing::info!("Configuration loaded (hash: {})", hash);
    }
    tracing::info!(
        "Start URL: {}, max depth: {}, file types: {}, mode: {}",
        config.start_url,
        config.max_depth,
        config.file_types,
        config.run_mode
    );

    let run_mode = config.run_mode;
    let summary = run_crawl(config).await.context("Crawl failed")?;

    println!("=== Scope-Harvest Summary ===\n");
    if summary.interrupted {
        println!("  Interrupted:   partial results");
    }
    println!("  Records:       {}", summary.records.len());
    println!("  Failures:      {}", summary.failures);
    match run_mode {
        RunMode::FullRun => {
            println!("  Files written: {}", summary.files_written);
            println!("  Output:        {}", summary.artifact.display());
        }
        RunMode::DryRun | RunMode::DryRunErrors => {
            println!("  Report:        {}", summary.artifact.display());
        }
    }

    Ok(())
}

/// Runs the `clean` subcommand
fn clean(
    config_path: Option<&Path>,
    source: Option<&Path>,
    export_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let export_root = match export_dir {
        Some(dir) => dir,
        None => configured_export_dir(config_path)?,
    };

    let source = resolve_source(source, Path::new(DEFAULT_SOURCE_DIR));
    let summary = clean_directory(&source, &export_root, &run_timestamp())
        .with_context(|| format!("Failed to clean {}", source.dir.display()))?;

    println!("=== Scope-Harvest Clean Summary ===\n");
    println!("  Cleaned:       {}", summary.cleaned);
    println!("  Failed:        {}", summary.failed);
    println!("  Output:        {}", summary.output_dir.display());

    Ok(())
}

/// Export root from the config file, or the built-in default without one
fn configured_export_dir(config_path: Option<&Path>) -> anyhow::Result<PathBuf> {
    let path = config_path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
    if config_path.is_none() && !path.exists() {
        return Ok(OutputConfig::default().export_dir);
    }

    let file = load_file_config(path).context("Failed to load configuration")?;
    Ok(file.output.unwrap_or_default().export_dir)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("scope_harvest=info,warn"),
            1 => EnvFilter::new("scope_harvest=debug,info"),
            2 => EnvFilter::new("scope_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
