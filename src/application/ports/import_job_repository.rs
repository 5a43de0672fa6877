use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{ImportJob, ImportJobId};

use super::RepositoryError;

/// Durable lifecycle store for import jobs.
///
/// Terminal writes are not compare-and-swap: each job has a single owning
/// task, so callers must not finalize the same job twice.
#[async_trait]
pub trait ImportJobRepository: Send + Sync {
    /// Inserts a new job. Fails with `DuplicateKey` if the id is taken.
    async fn create(&self, job: &ImportJob) -> Result<ImportJob, RepositoryError>;

    async fn get_by_id(&self, id: ImportJobId) -> Result<Option<ImportJob>, RepositoryError>;

    /// Every job ever recorded. Only the recovery sweep reads this.
    async fn list_all(&self) -> Result<Vec<ImportJob>, RepositoryError>;

    async fn mark_completed(
        &self,
        id: ImportJobId,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;

    async fn mark_failed(&self, id: ImportJobId, at: DateTime<Utc>)
    -> Result<(), RepositoryError>;
}
