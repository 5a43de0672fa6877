use tokio::sync::oneshot;

use talk_catalog::application::ports::{ImportJobRepository, StagingStore};
use talk_catalog::application::services::{ImportError, PoolRejected};
use talk_catalog::domain::{ImportJobId, ImportStatus};

use crate::helpers::{ImportFixture, csv, upload};

/// Occupies the only worker until the returned sender fires.
async fn occupy_worker(fixture: &ImportFixture) -> oneshot::Sender<()> {
    let (release, hold) = oneshot::channel::<()>();
    fixture
        .pool
        .submit(async move {
            let _ = hold.await;
        })
        .unwrap();
    while fixture.pool.running() == 0 {
        tokio::task::yield_now().await;
    }
    release
}

#[tokio::test]
async fn given_saturated_pool_when_starting_import_then_rejected_without_side_effects() {
    let fixture = ImportFixture::new(1, 0);
    let _release = occupy_worker(&fixture).await;

    let result = fixture
        .service
        .start_import(upload(&csv(&["T,A,May 2019,1,1,https://t/1"])), None)
        .await;

    assert!(matches!(
        result,
        Err(ImportError::Rejected(PoolRejected::Saturated { .. }))
    ));
    assert!(fixture.jobs.list_all().await.unwrap().is_empty());
    assert!(
        fixture
            .store
            .list_staged_imports()
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn given_queued_import_when_polling_status_then_processing_without_completion_time() {
    let fixture = ImportFixture::new(1, 1);
    let release = occupy_worker(&fixture).await;

    let id = fixture
        .service
        .start_import(upload(&csv(&["T,A,May 2019,1,1,https://t/1"])), None)
        .await
        .unwrap();

    let job = fixture.service.import_status(id).await.unwrap();
    assert_eq!(job.status, ImportStatus::Processing);
    assert!(job.completed_at.is_none());

    release.send(()).unwrap();
    let finished = fixture.wait_until_finished(id).await;
    assert_eq!(finished.status, ImportStatus::Completed);
    assert!(finished.completed_at.unwrap() >= finished.started_at);
    assert_eq!(fixture.talks.talks().await.len(), 1);
}

#[tokio::test]
async fn given_accepted_import_when_finished_then_staged_file_is_gone() {
    let fixture = ImportFixture::new(2, 0);

    let id = fixture
        .service
        .start_import(upload(&csv(&["T,A,May 2019,1,1,https://t/1"])), None)
        .await
        .unwrap();
    fixture.wait_until_finished(id).await;

    assert!(
        fixture
            .store
            .list_staged_imports()
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn given_unknown_id_when_polling_status_then_not_found() {
    let fixture = ImportFixture::new(1, 0);
    let id = ImportJobId::new();

    let result = fixture.service.import_status(id).await;

    assert!(matches!(result, Err(ImportError::NotFound(missing)) if missing == id));
}

#[tokio::test]
async fn given_empty_upload_when_starting_import_then_rejected_and_slot_freed() {
    let fixture = ImportFixture::new(1, 0);

    let result = fixture.service.start_import(upload(""), None).await;

    assert!(matches!(result, Err(ImportError::EmptyFile)));
    assert!(fixture.jobs.list_all().await.unwrap().is_empty());
    assert_eq!(fixture.pool.in_flight(), 0);
}

#[tokio::test]
async fn given_pool_shut_down_when_starting_import_then_rejected() {
    let fixture = ImportFixture::new(1, 0);
    fixture.pool.shutdown().await;

    let result = fixture
        .service
        .start_import(upload(&csv(&["T,A,May 2019,1,1,https://t/1"])), None)
        .await;

    assert!(matches!(
        result,
        Err(ImportError::Rejected(PoolRejected::ShuttingDown))
    ));
}
