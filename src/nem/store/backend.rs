use crate::error::StoreError;
use std::path::Path;

/// What a source handle currently points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Missing,
    File,
    /// Exists but is not a regular file (a directory, for instance).
    Other,
}

/// Abstract interface for raw layer I/O.
///
/// The backend deals in bytes keyed by source path; parsing is the codec's
/// job and record bookkeeping is the store's.
pub trait StorageBackend {
    fn probe(&self, source: &Path) -> Result<SourceKind, StoreError>;

    fn read(&self, source: &Path) -> Result<Vec<u8>, StoreError>;

    /// Replaces the whole source, creating parent directories as needed.
    fn write(&self, source: &Path, bytes: &[u8]) -> Result<(), StoreError>;
}
