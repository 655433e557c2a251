//! Storage-specific error type wrapping filesystem and JSON errors.

use std::path::PathBuf;

use hestia_domain::error::HestiaError;

/// Errors originating from the JSON file storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading, writing or listing a file failed.
    #[error("io error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stored file is not a valid recipe record.
    #[error("invalid recipe file {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The id cannot be used as a file name.
    #[error("recipe id {0:?} is not a valid file name")]
    InvalidId(String),
}

impl From<StorageError> for HestiaError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}
