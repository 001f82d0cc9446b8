//! Storage abstraction trait

use async_trait::async_trait;
use std::pin::Pin;
use thiserror::Error;
use tokio::io::AsyncRead;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// Backends receive the full key (orientation prefix included, see
/// [`crate::keys`]) and report only success or failure; public URLs are
/// derived by the caller from its configured base. No retries here: a
/// transient backend error is surfaced and fails the request.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Stream a body to the given key with the given content type.
    ///
    /// The reader is consumed until EOF without buffering the whole body in
    /// memory. `content_length` is a hint for backends that can use it.
    async fn put_stream(
        &self,
        key: &str,
        content_type: &str,
        content_length: Option<u64>,
        reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<()>;

    /// Delete an object by key. Deleting a missing object is an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Check whether an object exists.
    async fn exists(&self, key: &str) -> StorageResult<bool>;
}
