use super::backend::{SourceKind, StorageBackend};
use crate::error::StoreError;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

#[derive(Debug, Default, Clone, Copy)]
pub struct FsBackend;

impl FsBackend {
    pub fn new() -> Self {
        Self
    }
}

impl StorageBackend for FsBackend {
    fn probe(&self, source: &Path) -> Result<SourceKind, StoreError> {
        match fs::metadata(source) {
            Ok(meta) if meta.is_file() => Ok(SourceKind::File),
            Ok(_) => Ok(SourceKind::Other),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(SourceKind::Missing),
            Err(e) => Err(StoreError::io(source, e)),
        }
    }

    fn read(&self, source: &Path) -> Result<Vec<u8>, StoreError> {
        fs::read(source).map_err(|e| StoreError::io(source, e))
    }

    fn write(&self, source: &Path, bytes: &[u8]) -> Result<(), StoreError> {
        if let Some(parent) = source.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
            }
        }
        fs::write(source, bytes).map_err(|e| StoreError::io(source, e))
    }
}
