use chrono::{DateTime, Utc};

use super::{ImportJobId, ImportStatus};

/// Lifecycle record of one bulk import.
///
/// A job starts in `Processing` and is finalized exactly once. `completed_at`
/// is present iff the status is terminal, and `revision` grows on every write.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportJob {
    pub id: ImportJobId,
    pub status: ImportStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub revision: i64,
}

impl ImportJob {
    pub fn start(id: ImportJobId) -> Self {
        Self::start_at(id, Utc::now())
    }

    pub fn start_at(id: ImportJobId, started_at: DateTime<Utc>) -> Self {
        Self {
            id,
            status: ImportStatus::Processing,
            started_at,
            completed_at: None,
            revision: 0,
        }
    }

    pub fn mark_completed(&mut self, at: DateTime<Utc>) {
        self.finish(ImportStatus::Completed, at);
    }

    pub fn mark_failed(&mut self, at: DateTime<Utc>) {
        self.finish(ImportStatus::Failed, at);
    }

    /// True when the job is still `Processing` and began before `threshold`.
    pub fn is_stale(&self, threshold: DateTime<Utc>) -> bool {
        self.status == ImportStatus::Processing && self.started_at < threshold
    }

    fn finish(&mut self, status: ImportStatus, at: DateTime<Utc>) {
        debug_assert!(status.is_terminal());
        self.status = status;
        self.completed_at = Some(at);
        self.revision += 1;
    }
}
