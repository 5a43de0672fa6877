use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::application::ports::{ImportJobRepository, StagingStore};
use crate::domain::ImportJobId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    pub failed_jobs: Vec<ImportJobId>,
    pub deleted_files: usize,
    pub errors: usize,
}

/// Startup reconciliation for imports interrupted by a previous process.
///
/// Must run before the worker pool accepts submissions: every staged file
/// found is treated as orphaned and removed.
pub struct RecoverySweep {
    job_repository: Arc<dyn ImportJobRepository>,
    staging_store: Arc<dyn StagingStore>,
    stale_after: Duration,
}

impl RecoverySweep {
    pub fn new(
        job_repository: Arc<dyn ImportJobRepository>,
        staging_store: Arc<dyn StagingStore>,
        stale_after: Duration,
    ) -> Self {
        Self {
            job_repository,
            staging_store,
            stale_after,
        }
    }

    pub async fn run(&self) -> RecoveryReport {
        self.run_at(Utc::now()).await
    }

    /// Best effort: a failure on one job or file is logged and the sweep moves on.
    #[tracing::instrument(skip(self), fields(stale_after_minutes = self.stale_after.num_minutes()))]
    pub async fn run_at(&self, now: DateTime<Utc>) -> RecoveryReport {
        let mut report = RecoveryReport::default();
        self.fail_stale_jobs(now, &mut report).await;
        self.purge_staged_files(&mut report).await;

        tracing::info!(
            failed_jobs = report.failed_jobs.len(),
            deleted_files = report.deleted_files,
            errors = report.errors,
            "Recovery sweep finished"
        );
        report
    }

    async fn fail_stale_jobs(&self, now: DateTime<Utc>, report: &mut RecoveryReport) {
        let jobs = match self.job_repository.list_all().await {
            Ok(jobs) => jobs,
            Err(e) => {
                tracing::error!(error = %e, "Failed to scan import jobs");
                report.errors += 1;
                return;
            }
        };

        let threshold = now - self.stale_after;
        let stuck: Vec<_> = jobs.into_iter().filter(|j| j.is_stale(threshold)).collect();
        if stuck.is_empty() {
            tracing::info!("No stuck imports found on startup");
            return;
        }

        for job in stuck {
            match self.job_repository.mark_failed(job.id, now).await {
                Ok(()) => {
                    tracing::warn!(
                        job_id = %job.id,
                        started_at = %job.started_at,
                        "Marked stuck import as FAILED"
                    );
                    report.failed_jobs.push(job.id);
                }
                Err(e) => {
                    tracing::error!(job_id = %job.id, error = %e, "Failed to mark stuck import");
                    report.errors += 1;
                }
            }
        }
    }

    async fn purge_staged_files(&self, report: &mut RecoveryReport) {
        let paths = match self.staging_store.list_staged_imports().await {
            Ok(paths) => paths,
            Err(e) => {
                tracing::error!(error = %e, "Failed to scan staging area");
                report.errors += 1;
                return;
            }
        };

        for path in paths {
            match self.staging_store.delete(&path).await {
                Ok(()) => {
                    tracing::warn!(path = %path, "Deleted stale staged file on startup");
                    report.deleted_files += 1;
                }
                Err(e) => {
                    tracing::error!(path = %path, error = %e, "Failed to delete staged file");
                    report.errors += 1;
                }
            }
        }
    }
}
