use std::io;

use bytes::Bytes;
use futures::stream::BoxStream;

use crate::domain::StoragePath;

/// Blocking reader over a staged upload, consumed off the async runtime.
pub type StagedReader = Box<dyn io::Read + Send>;

#[async_trait::async_trait]
pub trait StagingStore: Send + Sync {
    async fn store(
        &self,
        path: &StoragePath,
        stream: BoxStream<'_, Result<Bytes, io::Error>>,
        content_length: Option<u64>,
    ) -> Result<u64, StagingStoreError>;

    async fn open(&self, path: &StoragePath) -> Result<StagedReader, StagingStoreError>;

    /// Removes the object. Deleting a path that no longer exists succeeds.
    async fn delete(&self, path: &StoragePath) -> Result<(), StagingStoreError>;

    /// Lists every staged import upload, including ones whose write never finished.
    async fn list_staged_imports(&self) -> Result<Vec<StoragePath>, StagingStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StagingStoreError {
    #[error("upload failed: {0}")]
    UploadFailed(String),
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("download failed: {0}")]
    DownloadFailed(String),
    #[error("delete failed: {0}")]
    DeleteFailed(String),
    #[error("list failed: {0}")]
    ListFailed(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
