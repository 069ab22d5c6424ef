//! Persistence error types.

use thiserror::Error;

/// Errors reading or writing persisted store state.
///
/// These never escape a store command; the store logs them and keeps its
/// in-memory state. They surface only from explicit durability calls such
/// as `Store::flush`.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("storage I/O error for {key}: {source}")]
    Io {
        /// Storage key being accessed.
        key: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// State could not be encoded or decoded.
    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Persisted blob was written by an unknown format version.
    #[error("unsupported persisted format version {0}")]
    UnsupportedVersion(u32),

    /// Storage backend rejected the operation.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// Background write task failed to complete.
    #[error("storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl StorageError {
    /// Wrap an I/O error with the key it concerns.
    pub(crate) fn io(key: &str, source: std::io::Error) -> Self {
        Self::Io {
            key: key.to_owned(),
            source,
        }
    }
}

/// Result type alias for `StorageError`.
pub type Result<T> = std::result::Result<T, StorageError>;
