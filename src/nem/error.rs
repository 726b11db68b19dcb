use std::path::PathBuf;
use thiserror::Error;

/// Failures while loading or persisting layers.
///
/// Any of these aborts the enclosing `load`/`commit` call. They are kept
/// apart from [`NemError::NotFound`], which is an ordinary outcome.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Source unavailable: {0} exists but is not a regular file")]
    SourceUnavailable(PathBuf),

    #[error("Failed to decode {path}: {message}")]
    Decode { path: PathBuf, message: String },

    #[error("Failed to encode {path}: {message}")]
    Encode { path: PathBuf, message: String },

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("No layers loaded")]
    NoLayers,

    #[error("Layer not loaded: {0}")]
    UnknownLayer(PathBuf),
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

#[derive(Error, Debug)]
pub enum NemError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("No record found matching {0}")]
    NotFound(String),

    #[error("{count} records match {filter}, expected exactly one")]
    Ambiguous { filter: String, count: usize },

    #[error("Unknown command: {0}")]
    UnknownCode(String),

    #[error("Code {0} already exists")]
    CodeExists(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Api Error: {0}")]
    Api(String),
}

impl NemError {
    /// True for load/commit malfunctions, false for recoverable lookups.
    pub fn is_store_error(&self) -> bool {
        matches!(self, NemError::Store(_))
    }
}

pub type Result<T> = std::result::Result<T, NemError>;
