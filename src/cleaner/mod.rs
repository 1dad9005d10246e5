//! HTML cleaner for harvested pages
//!
//! This module handles:
//! - Reducing saved HTML pages to their readable content
//! - Keeping the full structure of the first page in each directory and
//!   only the main content of the others
//! - Writing compact results into a fresh export directory
//!
//! # Example
//!
//! ```no_run
//! use scope_harvest::cleaner::{clean_directory, resolve_source, DEFAULT_SOURCE_DIR};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let source = resolve_source(None, Path::new(DEFAULT_SOURCE_DIR));
//! let summary = clean_directory(&source, Path::new("Export"), "2024-01-01_00-00-00")?;
//! println!("{} pages cleaned into {}", summary.cleaned, summary.output_dir.display());
//! # Ok(())
//! # }
//! ```

mod dom;
mod page;
mod rules;

pub use dom::{parse_document, CleanElement, CleanNode};
pub use page::{clean_page, finalize, CleanMode};
pub use rules::{
    clean_structure, is_boilerplate_element, ATTRIBUTES_TO_KEEP, BOILERPLATE_PATTERNS,
    TAGS_ALWAYS_REMOVE, TAGS_BOILERPLATE,
};

use crate::storage::{FlatDirectoryStorage, StorageError};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory cleaned when none is given
pub const DEFAULT_SOURCE_DIR: &str = "source";

/// File inside the default directory that may point at another source
pub const SOURCE_PATH_FILE: &str = "source_path.txt";

/// Errors that end a cleaning run
///
/// Unreadable individual pages are logged and skipped instead.
#[derive(Debug, Error)]
pub enum CleanError {
    #[error("Source directory {0} does not exist")]
    MissingSource(PathBuf),

    #[error("Invalid source pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result type for cleaning operations
pub type CleanResult<T> = Result<T, CleanError>;

/// Directory to clean
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanSource {
    pub dir: PathBuf,

    /// Chosen explicitly rather than the default; the export directory is
    /// then named after it instead of the run timestamp
    pub named: bool,
}

/// What a cleaning run produced
#[derive(Debug)]
pub struct CleanSummary {
    pub output_dir: PathBuf,

    /// Pages written
    pub cleaned: usize,

    /// Pages that could not be read
    pub failed: usize,
}

/// Picks the source directory
///
/// An explicit directory wins. Otherwise `<default_dir>/source_path.txt`
/// may name another existing directory; failing that, `default_dir` itself
/// is used.
pub fn resolve_source(explicit: Option<&Path>, default_dir: &Path) -> CleanSource {
    if let Some(dir) = explicit {
        return CleanSource {
            dir: dir.to_path_buf(),
            named: true,
        };
    }

    let pointer = default_dir.join(SOURCE_PATH_FILE);
    if let Ok(content) = fs::read_to_string(&pointer) {
        let target = content.trim().trim_matches(|c: char| c == '"' || c == '\'');
        if !target.is_empty() {
            let dir = PathBuf::from(target);
            if dir.exists() {
                tracing::info!("Using source path from {}: {}", pointer.display(), dir.display());
                return CleanSource { dir, named: true };
            }
            tracing::warn!(
                "Path in {} does not exist: {}",
                pointer.display(),
                dir.display()
            );
        }
    }

    tracing::info!("Using default source directory {}", default_dir.display());
    CleanSource {
        dir: default_dir.to_path_buf(),
        named: false,
    }
}

/// Cleans every `.html` file under the source directory
///
/// Files are grouped by their parent directory. The first file of each
/// group (in sorted order) keeps its full structure; the rest are reduced
/// to their main content. Output is flat, with `_N` suffixes on name
/// collisions, in `<export_root>/<name>` where `<name>` is the source
/// directory's name or `timestamp`, plus `_2`, `_3`, ... if taken.
pub fn clean_directory(
    source: &CleanSource,
    export_root: &Path,
    timestamp: &str,
) -> CleanResult<CleanSummary> {
    if !source.dir.is_dir() {
        return Err(CleanError::MissingSource(source.dir.clone()));
    }

    let name = match source.dir.file_name() {
        Some(dir_name) if source.named => dir_name.to_string_lossy().to_string(),
        _ => timestamp.to_string(),
    };
    let mut storage = FlatDirectoryStorage::create_unique(export_root, &name)?;

    let files = find_html_files(&source.dir)?;
    if files.is_empty() {
        tracing::warn!("No .html files found in {}", source.dir.display());
    } else {
        tracing::info!("Found {} files to clean", files.len());
    }

    let mut cleaned = 0usize;
    let mut failed = 0usize;

    for group in group_by_directory(files) {
        for (i, path) in group.iter().enumerate() {
            let mode = if i == 0 {
                CleanMode::FullStructure
            } else {
                CleanMode::MainContent
            };

            let html = match fs::read_to_string(path) {
                Ok(html) => html,
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", path.display(), e);
                    failed += 1;
                    continue;
                }
            };

            let Some(file_name) = path.file_name() else {
                continue;
            };

            tracing::debug!("Cleaning {} ({:?})", path.display(), mode);
            let output = clean_page(&html, mode);
            storage.store_named(&file_name.to_string_lossy(), output.as_bytes())?;
            cleaned += 1;
        }
    }

    tracing::info!(
        "Cleaning complete: {} files saved to {}",
        cleaned,
        storage.dir().display()
    );

    Ok(CleanSummary {
        output_dir: storage.dir().to_path_buf(),
        cleaned,
        failed,
    })
}

/// Lists `.html` files below `dir`, sorted
fn find_html_files(dir: &Path) -> CleanResult<Vec<PathBuf>> {
    let pattern = format!(
        "{}/**/*.html",
        glob::Pattern::escape(&dir.to_string_lossy())
    );

    let mut files: Vec<PathBuf> = glob::glob(&pattern)?
        .filter_map(|entry| match entry {
            Ok(path) if path.is_file() => Some(path),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Groups sorted files by parent directory, in order of first appearance
fn group_by_directory(files: Vec<PathBuf>) -> Vec<Vec<PathBuf>> {
    let mut order: Vec<PathBuf> = Vec::new();
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut groups: HashMap<PathBuf, Vec<PathBuf>> = HashMap::new();

    for file in files {
        let parent = file.parent().map(Path::to_path_buf).unwrap_or_default();
        if seen.insert(parent.clone()) {
            order.push(parent.clone());
        }
        groups.entry(parent).or_default().push(file);
    }

    order
        .into_iter()
        .filter_map(|dir| groups.remove(&dir))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PAGE: &str = r#"<html><body>
        <nav><a href="/">Home</a></nav>
        <main><p>PAGE_BODY</p></main>
    </body></html>"#;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn page(marker: &str) -> String {
        PAGE.replace("PAGE_BODY", marker)
    }

    #[test]
    fn test_first_file_per_directory_keeps_structure() {
        let src = TempDir::new().unwrap();
        write(src.path(), "a.html", &page("first"));
        write(src.path(), "b.html", &page("second"));
        write(src.path(), "docs/c.html", &page("docs first"));
        write(src.path(), "docs/notes.txt", "not html");

        let export = TempDir::new().unwrap();
        let source = CleanSource {
            dir: src.path().to_path_buf(),
            named: false,
        };
        let summary = clean_directory(&source, export.path(), "2024-01-01_00-00-00").unwrap();

        assert_eq!(summary.cleaned, 3);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.output_dir, export.path().join("2024-01-01_00-00-00"));

        let a = fs::read_to_string(summary.output_dir.join("a.html")).unwrap();
        assert!(a.starts_with("<html>"));
        assert!(a.contains("<nav>"));

        let b = fs::read_to_string(summary.output_dir.join("b.html")).unwrap();
        assert!(b.starts_with("<main>"));
        assert!(!b.contains("<nav>"));

        let c = fs::read_to_string(summary.output_dir.join("c.html")).unwrap();
        assert!(c.contains("<nav>"));
        assert!(!summary.output_dir.join("notes.txt").exists());
    }

    #[test]
    fn test_same_file_names_get_suffixes() {
        let src = TempDir::new().unwrap();
        write(src.path(), "one/index.html", &page("one"));
        write(src.path(), "two/index.html", &page("two"));

        let export = TempDir::new().unwrap();
        let source = CleanSource {
            dir: src.path().to_path_buf(),
            named: false,
        };
        let summary = clean_directory(&source, export.path(), "ts").unwrap();

        let first = fs::read_to_string(summary.output_dir.join("index.html")).unwrap();
        let second = fs::read_to_string(summary.output_dir.join("index_1.html")).unwrap();
        assert!(first.contains("one"));
        assert!(second.contains("two"));
    }

    #[test]
    fn test_named_source_names_export_and_never_reuses_it() {
        let root = TempDir::new().unwrap();
        let src = root.path().join("site-dump");
        write(&src, "index.html", &page("x"));

        let export = root.path().join("Export");
        let source = resolve_source(Some(src.as_path()), Path::new(DEFAULT_SOURCE_DIR));
        assert!(source.named);

        let first = clean_directory(&source, &export, "ts").unwrap();
        let second = clean_directory(&source, &export, "ts").unwrap();
        assert_eq!(first.output_dir, export.join("site-dump"));
        assert_eq!(second.output_dir, export.join("site-dump_2"));
    }

    #[test]
    fn test_missing_source_is_error() {
        let export = TempDir::new().unwrap();
        let source = CleanSource {
            dir: export.path().join("nope"),
            named: false,
        };
        let result = clean_directory(&source, export.path(), "ts");
        assert!(matches!(result, Err(CleanError::MissingSource(_))));
        assert!(!export.path().join("ts").exists());
    }

    #[test]
    fn test_resolve_source_pointer_file() {
        let root = TempDir::new().unwrap();
        let default_dir = root.path().join("source");
        let target = root.path().join("elsewhere");
        fs::create_dir_all(&default_dir).unwrap();
        fs::create_dir_all(&target).unwrap();

        assert_eq!(
            resolve_source(None, &default_dir),
            CleanSource {
                dir: default_dir.clone(),
                named: false
            }
        );

        fs::write(
            default_dir.join(SOURCE_PATH_FILE),
            format!("\"{}\"\n", target.display()),
        )
        .unwrap();
        assert_eq!(
            resolve_source(None, &default_dir),
            CleanSource {
                dir: target.clone(),
                named: true
            }
        );

        fs::write(default_dir.join(SOURCE_PATH_FILE), "/does/not/exist").unwrap();
        assert!(!resolve_source(None, &default_dir).named);
    }

    #[test]
    fn test_group_by_directory_order() {
        let files = vec![
            PathBuf::from("s/a/x.html"),
            PathBuf::from("s/b.html"),
            PathBuf::from("s/a/y.html"),
            PathBuf::from("s/c.html"),
        ];
        let groups = group_by_directory(files);
        assert_eq!(
            groups,
            vec![
                vec![PathBuf::from("s/a/x.html"), PathBuf::from("s/a/y.html")],
                vec![PathBuf::from("s/b.html"), PathBuf::from("s/c.html")],
            ]
        );
    }
}
