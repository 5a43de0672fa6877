use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use object_store::local::LocalFileSystem;
use object_store::path::Path as StorePath;
use object_store::{MultipartUpload, ObjectStore, PutPayload};

use crate::application::ports::{StagedReader, StagingStore, StagingStoreError};
use crate::domain::StoragePath;

/// Staging area on the local disk, rooted at a single directory.
pub struct LocalStagingStore {
    inner: Arc<LocalFileSystem>,
    base_path: PathBuf,
}

impl LocalStagingStore {
    pub fn new(base_path: PathBuf) -> Result<Self, StagingStoreError> {
        std::fs::create_dir_all(&base_path).map_err(StagingStoreError::Io)?;
        let fs = LocalFileSystem::new_with_prefix(&base_path)
            .map_err(|e| StagingStoreError::UploadFailed(e.to_string()))?;
        Ok(Self {
            inner: Arc::new(fs),
            base_path,
        })
    }

    pub fn base_path(&self) -> &std::path::Path {
        &self.base_path
    }
}

#[async_trait::async_trait]
impl StagingStore for LocalStagingStore {
    async fn store(
        &self,
        path: &StoragePath,
        mut stream: BoxStream<'_, Result<Bytes, io::Error>>,
        _content_length: Option<u64>,
    ) -> Result<u64, StagingStoreError> {
        let store_path = StorePath::from(path.as_str());
        let mut upload = self
            .inner
            .put_multipart(&store_path)
            .await
            .map_err(|e| StagingStoreError::UploadFailed(e.to_string()))?;

        let mut total_bytes: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let bytes = match chunk {
                Ok(b) => b,
                Err(e) => {
                    let _ = upload.abort().await;
                    return Err(StagingStoreError::Io(e));
                }
            };
            if bytes.is_empty() {
                continue;
            }
            total_bytes += bytes.len() as u64;
            if let Err(e) = upload.put_part(PutPayload::from(bytes)).await {
                let _ = upload.abort().await;
                return Err(StagingStoreError::UploadFailed(e.to_string()));
            }
        }

        upload
            .complete()
            .await
            .map_err(|e| StagingStoreError::UploadFailed(e.to_string()))?;

        Ok(total_bytes)
    }

    async fn open(&self, path: &StoragePath) -> Result<StagedReader, StagingStoreError> {
        let fs_path = self
            .inner
            .path_to_filesystem(&StorePath::from(path.as_str()))
            .map_err(|e| StagingStoreError::NotFound(e.to_string()))?;

        let file = tokio::fs::File::open(&fs_path).await.map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StagingStoreError::NotFound(path.to_string()),
            _ => StagingStoreError::Io(e),
        })?;

        Ok(Box::new(file.into_std().await))
    }

    /// Removes by filesystem path so in-progress `#N` upload parts can be purged too.
    async fn delete(&self, path: &StoragePath) -> Result<(), StagingStoreError> {
        match tokio::fs::remove_file(self.base_path.join(path.as_str())).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StagingStoreError::DeleteFailed(e.to_string())),
        }
    }

    /// Walks the staging directory itself: object listings hide the `<name>#N`
    /// part files a multipart write leaves behind until it completes.
    async fn list_staged_imports(&self) -> Result<Vec<StoragePath>, StagingStoreError> {
        let mut entries = tokio::fs::read_dir(&self.base_path)
            .await
            .map_err(|e| StagingStoreError::ListFailed(e.to_string()))?;

        let mut staged = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StagingStoreError::ListFailed(e.to_string()))?
        {
            let is_file = entry.file_type().await.is_ok_and(|t| t.is_file());
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            let path = StoragePath::from_raw(name);
            if is_file && path.is_staged_import() {
                staged.push(path);
            }
        }
        Ok(staged)
    }
}
