use std::collections::HashMap;
use std::io::{self, Cursor};

use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;
use tokio::sync::Mutex;

use crate::application::ports::{StagedReader, StagingStore, StagingStoreError};
use crate::domain::StoragePath;

/// Staging area held in memory, used where no disk is wanted.
#[derive(Default)]
pub struct InMemoryStagingStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryStagingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, path: &StoragePath) -> bool {
        self.objects.lock().await.contains_key(path.as_str())
    }

    pub async fn insert(&self, path: &StoragePath, data: impl Into<Vec<u8>>) {
        self.objects
            .lock()
            .await
            .insert(path.as_str().to_string(), data.into());
    }
}

#[async_trait::async_trait]
impl StagingStore for InMemoryStagingStore {
    async fn store(
        &self,
        path: &StoragePath,
        mut stream: BoxStream<'_, Result<Bytes, io::Error>>,
        _content_length: Option<u64>,
    ) -> Result<u64, StagingStoreError> {
        let mut data = Vec::new();
        while let Some(chunk) = stream.next().await {
            data.extend_from_slice(&chunk?);
        }
        let size = data.len() as u64;
        self.insert(path, data).await;
        Ok(size)
    }

    async fn open(&self, path: &StoragePath) -> Result<StagedReader, StagingStoreError> {
        let objects = self.objects.lock().await;
        let data = objects
            .get(path.as_str())
            .ok_or_else(|| StagingStoreError::NotFound(path.to_string()))?;
        Ok(Box::new(Cursor::new(data.clone())))
    }

    async fn delete(&self, path: &StoragePath) -> Result<(), StagingStoreError> {
        self.objects.lock().await.remove(path.as_str());
        Ok(())
    }

    async fn list_staged_imports(&self) -> Result<Vec<StoragePath>, StagingStoreError> {
        Ok(self
            .objects
            .lock()
            .await
            .keys()
            .map(|key| StoragePath::from_raw(key.clone()))
            .filter(StoragePath::is_staged_import)
            .collect())
    }
}
