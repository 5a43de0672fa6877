use std::sync::Arc;

use chrono::{Duration, Utc};

use talk_catalog::application::ports::ImportJobRepository;
use talk_catalog::application::services::RecoverySweep;
use talk_catalog::domain::{ImportJob, ImportJobId, ImportStatus, StoragePath};
use talk_catalog::infrastructure::persistence::InMemoryImportJobRepository;
use talk_catalog::infrastructure::storage::InMemoryStagingStore;

struct SweepFixture {
    jobs: Arc<InMemoryImportJobRepository>,
    store: Arc<InMemoryStagingStore>,
    sweep: RecoverySweep,
}

fn sweep_fixture() -> SweepFixture {
    let jobs = Arc::new(InMemoryImportJobRepository::new());
    let store = Arc::new(InMemoryStagingStore::new());
    let sweep = RecoverySweep::new(jobs.clone(), store.clone(), Duration::minutes(30));
    SweepFixture { jobs, store, sweep }
}

#[tokio::test]
async fn given_stale_processing_job_when_sweeping_then_marked_failed_and_file_purged() {
    let fixture = sweep_fixture();
    let now = Utc::now();
    let id = ImportJobId::new();
    fixture
        .jobs
        .create(&ImportJob::start_at(id, now - Duration::hours(2)))
        .await
        .unwrap();
    let staged = StoragePath::staged_import(&id);
    fixture.store.insert(&staged, "title\n").await;

    let report = fixture.sweep.run_at(now).await;

    assert_eq!(report.failed_jobs, vec![id]);
    assert_eq!(report.deleted_files, 1);
    assert_eq!(report.errors, 0);
    let job = fixture.jobs.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(job.status, ImportStatus::Failed);
    assert_eq!(job.completed_at, Some(now));
    assert!(!fixture.store.contains(&staged).await);
}

#[tokio::test]
async fn given_recent_processing_job_when_sweeping_then_left_untouched() {
    let fixture = sweep_fixture();
    let now = Utc::now();
    let id = ImportJobId::new();
    fixture
        .jobs
        .create(&ImportJob::start_at(id, now - Duration::minutes(5)))
        .await
        .unwrap();

    let report = fixture.sweep.run_at(now).await;

    assert!(report.failed_jobs.is_empty());
    let job = fixture.jobs.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(job.status, ImportStatus::Processing);
    assert!(job.completed_at.is_none());
}

#[tokio::test]
async fn given_terminal_old_job_when_sweeping_then_not_rewritten() {
    let fixture = sweep_fixture();
    let now = Utc::now();
    let id = ImportJobId::new();
    let started = now - Duration::days(3);
    fixture
        .jobs
        .create(&ImportJob::start_at(id, started))
        .await
        .unwrap();
    let finished = started + Duration::minutes(1);
    fixture.jobs.mark_completed(id, finished).await.unwrap();

    let report = fixture.sweep.run_at(now).await;

    assert!(report.failed_jobs.is_empty());
    let job = fixture.jobs.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(job.status, ImportStatus::Completed);
    assert_eq!(job.completed_at, Some(finished));
}

#[tokio::test]
async fn given_unrelated_files_when_sweeping_then_only_staged_imports_are_deleted() {
    let fixture = sweep_fixture();
    let orphan = StoragePath::staged_import(&ImportJobId::new());
    let unrelated = StoragePath::from_raw("exports/report.csv");
    fixture.store.insert(&orphan, "x").await;
    fixture.store.insert(&unrelated, "y").await;

    let report = fixture.sweep.run().await;

    assert_eq!(report.deleted_files, 1);
    assert!(!fixture.store.contains(&orphan).await);
    assert!(fixture.store.contains(&unrelated).await);
}
