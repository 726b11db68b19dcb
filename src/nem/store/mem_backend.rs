use super::backend::{SourceKind, StorageBackend};
use crate::error::StoreError;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};

/// In-memory storage backend for testing.
///
/// Uses `RefCell` for interior mutability since nem is single-threaded, so
/// the `StorageBackend` trait can take `&self` everywhere.
#[derive(Debug, Default)]
pub struct MemBackend {
    files: RefCell<BTreeMap<PathBuf, Vec<u8>>>,
    dirs: RefCell<BTreeSet<PathBuf>>,
    failing: RefCell<BTreeSet<PathBuf>>,
    writes: RefCell<usize>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: impl Into<PathBuf>, contents: &str) -> Self {
        self.files
            .borrow_mut()
            .insert(path.into(), contents.as_bytes().to_vec());
        self
    }

    pub fn with_dir(self, path: impl Into<PathBuf>) -> Self {
        self.dirs.borrow_mut().insert(path.into());
        self
    }

    /// Makes every later write to `path` fail, for error-path tests.
    pub fn fail_writes_to(&self, path: impl Into<PathBuf>) {
        self.failing.borrow_mut().insert(path.into());
    }

    pub fn heal(&self) {
        self.failing.borrow_mut().clear();
    }

    pub fn contents(&self, path: &Path) -> Option<String> {
        self.files
            .borrow()
            .get(path)
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        *self.writes.borrow()
    }
}

impl StorageBackend for MemBackend {
    fn probe(&self, source: &Path) -> Result<SourceKind, StoreError> {
        if self.dirs.borrow().contains(source) {
            Ok(SourceKind::Other)
        } else if self.files.borrow().contains_key(source) {
            Ok(SourceKind::File)
        } else {
            Ok(SourceKind::Missing)
        }
    }

    fn read(&self, source: &Path) -> Result<Vec<u8>, StoreError> {
        self.files.borrow().get(source).cloned().ok_or_else(|| {
            StoreError::io(source, io::Error::new(io::ErrorKind::NotFound, "no such file"))
        })
    }

    fn write(&self, source: &Path, bytes: &[u8]) -> Result<(), StoreError> {
        if self.failing.borrow().contains(source) {
            return Err(StoreError::io(
                source,
                io::Error::new(io::ErrorKind::PermissionDenied, "simulated write error"),
            ));
        }
        self.files
            .borrow_mut()
            .insert(source.to_path_buf(), bytes.to_vec());
        *self.writes.borrow_mut() += 1;
        Ok(())
    }
}
