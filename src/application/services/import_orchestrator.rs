use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::Instrument;

use crate::application::ports::{
    ImportJobRepository, RepositoryError, StagingStore, StagingStoreError, TalkRepository,
};
use crate::application::services::talk_csv_reader::{CsvReadError, read_talk_batches};
use crate::domain::{ImportJobId, StoragePath};

/// Parsed batches buffered between the blocking reader and the sink.
const BATCH_CHANNEL_DEPTH: usize = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub rows_read: u64,
    pub rows_imported: u64,
    pub rows_skipped: u64,
    pub batches_flushed: u64,
}

/// Drives one staged upload into the talk sink and finalizes its job record.
pub struct ImportOrchestrator {
    job_repository: Arc<dyn ImportJobRepository>,
    talk_repository: Arc<dyn TalkRepository>,
    staging_store: Arc<dyn StagingStore>,
    batch_size: usize,
}

impl ImportOrchestrator {
    pub fn new(
        job_repository: Arc<dyn ImportJobRepository>,
        talk_repository: Arc<dyn TalkRepository>,
        staging_store: Arc<dyn StagingStore>,
        batch_size: usize,
    ) -> Self {
        Self {
            job_repository,
            talk_repository,
            staging_store,
            batch_size: batch_size.max(1),
        }
    }

    /// Imports the staged file of `job_id`, marks the job COMPLETED or FAILED,
    /// then deletes the staged file whatever the outcome.
    pub async fn run(
        &self,
        job_id: ImportJobId,
        staged: StoragePath,
    ) -> Result<ImportSummary, ImportWorkerError> {
        let span = tracing::info_span!("import_job", job_id = %job_id, path = %staged);

        async {
            let result = self.process_and_finalize(job_id, &staged).await;
            self.release_staged_file(&staged).await;
            result
        }
        .instrument(span)
        .await
    }

    async fn process_and_finalize(
        &self,
        job_id: ImportJobId,
        staged: &StoragePath,
    ) -> Result<ImportSummary, ImportWorkerError> {
        match self.process(staged).await {
            Ok(summary) => {
                self.job_repository
                    .mark_completed(job_id, Utc::now())
                    .await
                    .map_err(|e| {
                        tracing::error!(
                            error = %e,
                            "Could not mark import COMPLETED, leaving it to the recovery sweep"
                        );
                        ImportWorkerError::Repository(e)
                    })?;
                tracing::info!(
                    rows_read = summary.rows_read,
                    rows_imported = summary.rows_imported,
                    rows_skipped = summary.rows_skipped,
                    batches = summary.batches_flushed,
                    "Import completed"
                );
                Ok(summary)
            }
            Err(e) => {
                tracing::error!(error = %e, "Import failed");
                if let Err(store_err) = self.job_repository.mark_failed(job_id, Utc::now()).await {
                    tracing::error!(
                        error = %store_err,
                        "Could not mark import FAILED, leaving it to the recovery sweep"
                    );
                }
                Err(e)
            }
        }
    }

    async fn process(&self, staged: &StoragePath) -> Result<ImportSummary, ImportWorkerError> {
        let reader = self
            .staging_store
            .open(staged)
            .await
            .map_err(ImportWorkerError::Staging)?;

        let (tx, mut rx) = mpsc::channel(BATCH_CHANNEL_DEPTH);
        let batch_size = self.batch_size;
        let span = tracing::Span::current();
        let reader_task = tokio::task::spawn_blocking(move || {
            let _guard = span.enter();
            read_talk_batches(reader, batch_size, tx)
        });

        let mut summary = ImportSummary::default();
        while let Some(batch) = rx.recv().await {
            if let Err(e) = self.talk_repository.create_many(&batch).await {
                rx.close();
                // The reader must let go of the staged file before it is deleted.
                if let Ok(Err(read_err)) = reader_task.await {
                    tracing::debug!(error = %read_err, "Reader stopped after sink failure");
                }
                return Err(ImportWorkerError::Sink(e));
            }
            summary.batches_flushed += 1;
            summary.rows_imported += batch.len() as u64;
            tracing::debug!(size = batch.len(), batch = summary.batches_flushed, "Batch flushed");
        }

        let stats = reader_task
            .await
            .map_err(|e| ImportWorkerError::ReaderTask(e.to_string()))?
            .map_err(ImportWorkerError::Read)?;

        summary.rows_read = stats.rows_read;
        summary.rows_skipped = stats.rows_skipped;
        Ok(summary)
    }

    async fn release_staged_file(&self, staged: &StoragePath) {
        if let Err(e) = self.staging_store.delete(staged).await {
            tracing::warn!(error = %e, "Failed to delete staged file");
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ImportWorkerError {
    #[error("staging store: {0}")]
    Staging(StagingStoreError),
    #[error("reading staged file: {0}")]
    Read(CsvReadError),
    #[error("talk sink: {0}")]
    Sink(RepositoryError),
    #[error("repository: {0}")]
    Repository(RepositoryError),
    #[error("reader task: {0}")]
    ReaderTask(String),
}
