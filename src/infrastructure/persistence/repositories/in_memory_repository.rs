use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::application::ports::{ImportJobRepository, RepositoryError, TalkRepository};
use crate::domain::{ImportJob, ImportJobId, TalkRequest};

/// Process-local job store. Records vanish with the process, so the recovery
/// sweep has nothing to repair when this provider is used.
#[derive(Default)]
pub struct InMemoryImportJobRepository {
    jobs: RwLock<HashMap<ImportJobId, ImportJob>>,
}

impl InMemoryImportJobRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn update(
        &self,
        id: ImportJobId,
        apply: impl FnOnce(&mut ImportJob),
    ) -> Result<(), RepositoryError> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        apply(job);
        Ok(())
    }
}

#[async_trait::async_trait]
impl ImportJobRepository for InMemoryImportJobRepository {
    async fn create(&self, job: &ImportJob) -> Result<ImportJob, RepositoryError> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&job.id) {
            return Err(RepositoryError::DuplicateKey(job.id.to_string()));
        }
        jobs.insert(job.id, job.clone());
        Ok(job.clone())
    }

    async fn get_by_id(&self, id: ImportJobId) -> Result<Option<ImportJob>, RepositoryError> {
        Ok(self.jobs.read().await.get(&id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<ImportJob>, RepositoryError> {
        let mut jobs: Vec<_> = self.jobs.read().await.values().cloned().collect();
        jobs.sort_by_key(|j| j.started_at);
        Ok(jobs)
    }

    async fn mark_completed(
        &self,
        id: ImportJobId,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        self.update(id, |job| job.mark_completed(at)).await
    }

    async fn mark_failed(&self, id: ImportJobId, at: DateTime<Utc>) -> Result<(), RepositoryError> {
        self.update(id, |job| job.mark_failed(at)).await
    }
}

/// Keeps every flushed batch in arrival order.
#[derive(Default)]
pub struct InMemoryTalkRepository {
    batches: RwLock<Vec<Vec<TalkRequest>>>,
}

impl InMemoryTalkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn talks(&self) -> Vec<TalkRequest> {
        self.batches.read().await.iter().flatten().cloned().collect()
    }

    pub async fn batch_sizes(&self) -> Vec<usize> {
        self.batches.read().await.iter().map(Vec::len).collect()
    }
}

#[async_trait::async_trait]
impl TalkRepository for InMemoryTalkRepository {
    async fn create_many(&self, talks: &[TalkRequest]) -> Result<(), RepositoryError> {
        self.batches.write().await.push(talks.to_vec());
        Ok(())
    }
}
