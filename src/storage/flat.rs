//! Flat directory storage backend
//!
//! Writes every target file directly into one per-run directory; no
//! subdirectories are ever created.

use crate::storage::namer::{name_for, NameAllocator};
use crate::storage::traits::{Storage, StorageError, StorageResult};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use url::Url;

/// Storage writing into `<export-root>/<timestamp>/`
#[derive(Debug)]
pub struct FlatDirectoryStorage {
    dir: PathBuf,
    allocator: NameAllocator,
    written: usize,
}

impl FlatDirectoryStorage {
    /// Creates the run directory and returns a writer for it
    ///
    /// The export root is created if missing; the run directory itself must
    /// not exist yet, so two runs never share one.
    ///
    /// # Arguments
    ///
    /// * `export_root` - Parent directory for all runs
    /// * `timestamp` - Run timestamp, used as the directory name
    pub fn create(export_root: &Path, timestamp: &str) -> StorageResult<Self> {
        fs::create_dir_all(export_root).map_err(|source| StorageError::CreateDir {
            path: export_root.to_path_buf(),
            source,
        })?;

        let dir = export_root.join(timestamp);
        match fs::create_dir(&dir) {
            Ok(()) => Ok(Self::open(dir)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(StorageError::RunDirExists(dir)),
            Err(source) => Err(StorageError::CreateDir { path: dir, source }),
        }
    }

    /// Creates `<export-root>/<name>/`, or `<name>_2`, `<name>_3`, ... when
    /// earlier directories of that name exist
    pub fn create_unique(export_root: &Path, name: &str) -> StorageResult<Self> {
        fs::create_dir_all(export_root).map_err(|source| StorageError::CreateDir {
            path: export_root.to_path_buf(),
            source,
        })?;

        let mut counter = 1usize;
        loop {
            let dir = if counter == 1 {
                export_root.join(name)
            } else {
                export_root.join(format!("{}_{}", name, counter))
            };
            match fs::create_dir(&dir) {
                Ok(()) => return Ok(Self::open(dir)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => counter += 1,
                Err(source) => return Err(StorageError::CreateDir { path: dir, source }),
            }
        }
    }

    fn open(dir: PathBuf) -> Self {
        tracing::info!("Writing files to {}", dir.display());
        Self {
            dir,
            allocator: NameAllocator::new(),
            written: 0,
        }
    }

    /// The run directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `body` under `base`, or under `base` with a `_N` suffix when
    /// that name is taken
    pub fn store_named(&mut self, base: &str, body: &[u8]) -> StorageResult<PathBuf> {
        if matches!(base, "" | "." | "..") || base.contains(['/', '\\']) {
            return Err(StorageError::InvalidName(base.to_string()));
        }

        loop {
            let dir = &self.dir;
            let name = self
                .allocator
                .allocate_avoiding(&base, |candidate| dir.join(candidate).exists());
            let path = self.dir.join(&name);

            // create_new refuses to clobber a file that appeared in the meantime
            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(source) => return Err(StorageError::Write { path, source }),
            };

            file.write_all(body)
                .map_err(|source| StorageError::Write {
                    path: path.clone(),
                    source,
                })?;

            self.written += 1;
            tracing::debug!("Stored {}", name);
            return Ok(path);
        }
    }
}

impl Storage for FlatDirectoryStorage {
    fn store(&mut self, url: &Url, body: &[u8]) -> StorageResult<PathBuf> {
        let base = name_for(url).ok_or_else(|| StorageError::InvalidName(url.to_string()))?;
        let path = self.store_named(&base, body)?;
        tracing::debug!("Stored {} as {}", url, path.display());
        Ok(path)
    }

    fn files_written(&self) -> usize {
        self.written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_makes_run_directory() {
        let root = TempDir::new().unwrap();
        let storage = FlatDirectoryStorage::create(root.path(), "2024-01-01_00-00-00").unwrap();
        assert!(storage.dir().is_dir());
        assert_eq!(storage.files_written(), 0);
    }

    #[test]
    fn test_store_flat_with_collisions() {
        let root = TempDir::new().unwrap();
        let mut storage = FlatDirectoryStorage::create(root.path(), "run").unwrap();

        let a = Url::parse("https://site.com/docs/report.pdf").unwrap();
        let b = Url::parse("https://site.com/docs/report.pdf?v=2").unwrap();

        let first = storage.store(&a, b"one").unwrap();
        let second = storage.store(&b, b"two").unwrap();

        assert_eq!(first.file_name().unwrap(), "site.com_docs_report.pdf");
        assert_eq!(second.file_name().unwrap(), "site.com_docs_report_1.pdf");
        assert_eq!(fs::read(&first).unwrap(), b"one");
        assert_eq!(fs::read(&second).unwrap(), b"two");
        assert_eq!(storage.files_written(), 2);

        let entries: Vec<_> = fs::read_dir(storage.dir()).unwrap().collect();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.as_ref().unwrap().path().is_file()));
    }

    #[test]
    fn test_store_never_overwrites_existing_file() {
        let root = TempDir::new().unwrap();
        let mut storage = FlatDirectoryStorage::create(root.path(), "run").unwrap();
        fs::write(storage.dir().join("site.com_a.txt"), b"keep").unwrap();

        let path = storage
            .store(&Url::parse("https://site.com/a.txt").unwrap(), b"new")
            .unwrap();

        assert_eq!(path.file_name().unwrap(), "site.com_a_1.txt");
        assert_eq!(fs::read(storage.dir().join("site.com_a.txt")).unwrap(), b"keep");
    }

    #[test]
    fn test_create_refuses_existing_run_directory() {
        let root = TempDir::new().unwrap();
        let first = FlatDirectoryStorage::create(root.path(), "2024-01-01_00-00-00").unwrap();
        fs::write(first.dir().join("site.com_a.txt"), b"earlier run").unwrap();

        let second = FlatDirectoryStorage::create(root.path(), "2024-01-01_00-00-00");
        assert!(matches!(second, Err(StorageError::RunDirExists(_))));
        assert_eq!(
            fs::read(first.dir().join("site.com_a.txt")).unwrap(),
            b"earlier run"
        );
    }

    #[test]
    fn test_create_unique_appends_counter() {
        let root = TempDir::new().unwrap();
        let first = FlatDirectoryStorage::create_unique(root.path(), "site").unwrap();
        let second = FlatDirectoryStorage::create_unique(root.path(), "site").unwrap();
        let third = FlatDirectoryStorage::create_unique(root.path(), "site").unwrap();

        assert_eq!(first.dir(), root.path().join("site"));
        assert_eq!(second.dir(), root.path().join("site_2"));
        assert_eq!(third.dir(), root.path().join("site_3"));
    }

    #[test]
    fn test_store_named_suffixes_duplicates() {
        let root = TempDir::new().unwrap();
        let mut storage = FlatDirectoryStorage::create(root.path(), "run").unwrap();

        let first = storage.store_named("index.html", b"a").unwrap();
        let second = storage.store_named("index.html", b"b").unwrap();

        assert_eq!(first.file_name().unwrap(), "index.html");
        assert_eq!(second.file_name().unwrap(), "index_1.html");
        assert!(matches!(
            storage.store_named("../escape.html", b"c"),
            Err(StorageError::InvalidName(_))
        ));
    }

    #[test]
    fn test_create_fails_when_root_is_a_file() {
        let root = TempDir::new().unwrap();
        let blocker = root.path().join("Export");
        fs::write(&blocker, b"").unwrap();

        let result = FlatDirectoryStorage::create(&blocker, "run");
        assert!(matches!(result, Err(StorageError::CreateDir { .. })));
    }
}
