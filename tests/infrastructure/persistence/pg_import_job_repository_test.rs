use chrono::{SubsecRound, Utc};

use talk_catalog::application::ports::{ImportJobRepository, RepositoryError};
use talk_catalog::domain::{ImportJob, ImportJobId, ImportStatus};

use crate::helpers::TestPostgres;

#[tokio::test]
#[ignore = "requires Docker"]
async fn given_new_job_when_creating_and_retrieving_then_job_is_persisted() {
    let test_pg = TestPostgres::new().await;
    let job = ImportJob::start_at(ImportJobId::new(), Utc::now().trunc_subsecs(3));

    test_pg
        .job_repository
        .create(&job)
        .await
        .expect("Failed to create job");

    let retrieved = test_pg
        .job_repository
        .get_by_id(job.id)
        .await
        .expect("Failed to retrieve job")
        .expect("Job not found");

    assert_eq!(retrieved, job);
    assert_eq!(retrieved.status, ImportStatus::Processing);
    assert!(retrieved.completed_at.is_none());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn given_processing_job_when_marking_failed_then_terminal_and_revision_bumped() {
    let test_pg = TestPostgres::new().await;
    let job = ImportJob::start_at(ImportJobId::new(), Utc::now().trunc_subsecs(3));
    test_pg.job_repository.create(&job).await.unwrap();
    let at = Utc::now().trunc_subsecs(3);

    test_pg.job_repository.mark_failed(job.id, at).await.unwrap();

    let retrieved = test_pg
        .job_repository
        .get_by_id(job.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(retrieved.status, ImportStatus::Failed);
    assert_eq!(retrieved.completed_at, Some(at));
    assert_eq!(retrieved.revision, job.revision + 1);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn given_duplicate_id_when_creating_then_duplicate_key() {
    let test_pg = TestPostgres::new().await;
    let job = ImportJob::start(ImportJobId::new());
    test_pg.job_repository.create(&job).await.unwrap();

    let result = test_pg.job_repository.create(&job).await;

    assert!(matches!(result, Err(RepositoryError::DuplicateKey(_))));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn given_unknown_id_when_marking_completed_then_not_found() {
    let test_pg = TestPostgres::new().await;

    let result = test_pg
        .job_repository
        .mark_completed(ImportJobId::new(), Utc::now())
        .await;

    assert!(matches!(result, Err(RepositoryError::NotFound(_))));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn given_several_jobs_when_listing_then_all_returned() {
    let test_pg = TestPostgres::new().await;
    for _ in 0..3 {
        test_pg
            .job_repository
            .create(&ImportJob::start(ImportJobId::new()))
            .await
            .unwrap();
    }

    let jobs = test_pg.job_repository.list_all().await.unwrap();

    assert_eq!(jobs.len(), 3);
}
