use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::application::ports::{ImportJobRepository, RepositoryError};
use crate::domain::{ImportJob, ImportJobId, ImportStatus};

pub struct PgImportJobRepository {
    pool: PgPool,
}

impl PgImportJobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn finish(
        &self,
        id: ImportJobId,
        status: ImportStatus,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE import_jobs
            SET status = $1, completed_at = $2, revision = revision + 1
            WHERE id = $3
            "#,
        )
        .bind(status.as_str())
        .bind(at)
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct ImportJobRow {
    id: Uuid,
    status: String,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    revision: i64,
}

impl TryFrom<ImportJobRow> for ImportJob {
    type Error = RepositoryError;

    fn try_from(r: ImportJobRow) -> Result<Self, Self::Error> {
        let status = r
            .status
            .parse::<ImportStatus>()
            .map_err(RepositoryError::QueryFailed)?;

        Ok(ImportJob {
            id: ImportJobId::from_uuid(r.id),
            status,
            started_at: r.started_at,
            completed_at: r.completed_at,
            revision: r.revision,
        })
    }
}

#[async_trait]
impl ImportJobRepository for PgImportJobRepository {
    #[instrument(skip(self, job), fields(job_id = %job.id))]
    async fn create(&self, job: &ImportJob) -> Result<ImportJob, RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO import_jobs (id, status, started_at, completed_at, revision)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(job.id.as_uuid())
        .bind(job.status.as_str())
        .bind(job.started_at)
        .bind(job.completed_at)
        .bind(job.revision)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::DuplicateKey(job.id.to_string())
            }
            other => RepositoryError::QueryFailed(other.to_string()),
        })?;

        Ok(job.clone())
    }

    #[instrument(skip(self), fields(job_id = %id))]
    async fn get_by_id(&self, id: ImportJobId) -> Result<Option<ImportJob>, RepositoryError> {
        let row = sqlx::query_as::<_, ImportJobRow>(
            r#"
            SELECT id, status, started_at, completed_at, revision
            FROM import_jobs
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        row.map(ImportJob::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> Result<Vec<ImportJob>, RepositoryError> {
        let rows = sqlx::query_as::<_, ImportJobRow>(
            r#"
            SELECT id, status, started_at, completed_at, revision
            FROM import_jobs
            ORDER BY started_at
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        rows.into_iter().map(ImportJob::try_from).collect()
    }

    #[instrument(skip(self), fields(job_id = %id))]
    async fn mark_completed(
        &self,
        id: ImportJobId,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        self.finish(id, ImportStatus::Completed, at).await
    }

    #[instrument(skip(self), fields(job_id = %id))]
    async fn mark_failed(&self, id: ImportJobId, at: DateTime<Utc>) -> Result<(), RepositoryError> {
        self.finish(id, ImportStatus::Failed, at).await
    }
}
