use std::io;
use std::sync::Arc;

use bytes::Bytes;
use futures::stream::BoxStream;

use crate::application::ports::{
    ImportJobRepository, RepositoryError, StagingStore, StagingStoreError,
};
use crate::application::services::{ImportOrchestrator, ImportWorkerPool, PoolRejected};
use crate::domain::{ImportJob, ImportJobId, StoragePath};

/// Submission and status boundary of the bulk import subsystem.
pub struct ImportService {
    job_repository: Arc<dyn ImportJobRepository>,
    staging_store: Arc<dyn StagingStore>,
    orchestrator: Arc<ImportOrchestrator>,
    pool: ImportWorkerPool,
}

impl ImportService {
    pub fn new(
        job_repository: Arc<dyn ImportJobRepository>,
        staging_store: Arc<dyn StagingStore>,
        orchestrator: Arc<ImportOrchestrator>,
        pool: ImportWorkerPool,
    ) -> Self {
        Self {
            job_repository,
            staging_store,
            orchestrator,
            pool,
        }
    }

    /// Admits, stages and enqueues an upload, returning as soon as the job is queued.
    ///
    /// Admission is decided before anything is written, so a rejected upload
    /// leaves neither a staged file nor a job record behind.
    pub async fn start_import(
        &self,
        upload: BoxStream<'_, Result<Bytes, io::Error>>,
        content_length: Option<u64>,
    ) -> Result<ImportJobId, ImportError> {
        let slot = self.pool.try_reserve()?;

        let job_id = ImportJobId::new();
        let staged = StoragePath::staged_import(&job_id);

        let size = match self.staging_store.store(&staged, upload, content_length).await {
            Ok(size) => size,
            Err(e) => {
                self.discard(&staged).await;
                return Err(ImportError::Staging(e));
            }
        };
        if size == 0 {
            self.discard(&staged).await;
            return Err(ImportError::EmptyFile);
        }

        let job = match self.job_repository.create(&ImportJob::start(job_id)).await {
            Ok(job) => job,
            Err(e) => {
                self.discard(&staged).await;
                return Err(ImportError::Repository(e));
            }
        };

        let orchestrator = Arc::clone(&self.orchestrator);
        slot.spawn(async move {
            if let Err(e) = orchestrator.run(job_id, staged).await {
                tracing::error!(job_id = %job_id, error = %e, "Import job failed");
            }
        });

        tracing::info!(
            job_id = %job.id,
            bytes = size,
            started_at = %job.started_at,
            "CSV import job enqueued"
        );
        Ok(job.id)
    }

    pub async fn import_status(&self, id: ImportJobId) -> Result<ImportJob, ImportError> {
        self.job_repository
            .get_by_id(id)
            .await?
            .ok_or(ImportError::NotFound(id))
    }

    pub fn pool(&self) -> &ImportWorkerPool {
        &self.pool
    }

    async fn discard(&self, staged: &StoragePath) {
        if let Err(e) = self.staging_store.delete(staged).await {
            tracing::warn!(error = %e, path = %staged, "Failed to discard staged upload");
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("too many concurrent imports: {0}")]
    Rejected(#[from] PoolRejected),
    #[error("file is empty")]
    EmptyFile,
    #[error("staging: {0}")]
    Staging(#[from] StagingStoreError),
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
    #[error("import not found: {0}")]
    NotFound(ImportJobId),
}
