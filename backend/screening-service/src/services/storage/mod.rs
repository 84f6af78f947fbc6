/// Blob storage for uploaded videos
///
/// Content is stored under a caller-supplied key and addressed afterwards by
/// the location string `url(key)` returns.
pub mod local;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::LocalBoxStream;
use std::io;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{StorageBackend, StorageConfig};

pub use local::LocalStorage;

/// Chunked upload body handed to `BlobStorage::save`.
pub type ByteStream = LocalBoxStream<'static, io::Result<Bytes>>;

/// Result type alias for blob storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Save failures.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Writing to the backing volume failed
    #[error("Storage I/O error: {0}")]
    Io(#[from] io::Error),

    /// Key escapes the storage root or is otherwise unusable
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    /// The incoming byte stream failed before it was fully consumed
    #[error("Upload stream failed: {0}")]
    Stream(io::Error),
}

#[async_trait(?Send)]
pub trait BlobStorage: Send + Sync {
    /// Consume `data` completely and store it under `key`, replacing any
    /// previous content. Returns the location of the stored object.
    async fn save(
        &self,
        key: &str,
        data: ByteStream,
        content_type: Option<&str>,
    ) -> StorageResult<String>;

    /// Location for `key`. Does not check that the object exists.
    fn url(&self, key: &str) -> String;
}

/// Build the storage backend selected by `STORAGE_BACKEND`.
pub fn build_storage(config: &StorageConfig) -> StorageResult<Arc<dyn BlobStorage>> {
    match config.backend {
        StorageBackend::Local => Ok(Arc::new(LocalStorage::new(&config.upload_dir)?)),
    }
}

/// Storage key for an invite's video.
pub fn video_key(invite_id: &str) -> String {
    format!("{}.webm", invite_id)
}
