use std::io::{self, Read};

use std::time::Duration;

use bytes::Bytes;
use futures::{StreamExt, stream};

use talk_catalog::application::ports::{StagingStore, StagingStoreError};
use talk_catalog::domain::{ImportJobId, StoragePath};
use talk_catalog::infrastructure::storage::LocalStagingStore;

fn create_test_store() -> (tempfile::TempDir, LocalStagingStore) {
    let dir = tempfile::TempDir::new().unwrap();
    let store = LocalStagingStore::new(dir.path().to_path_buf()).unwrap();
    (dir, store)
}

async fn stage(store: &LocalStagingStore, path: &StoragePath, content: &'static str) -> u64 {
    let chunks = vec![Ok(Bytes::from(content))];
    store
        .store(path, Box::pin(stream::iter(chunks)), None)
        .await
        .unwrap()
}

#[tokio::test]
async fn given_chunked_stream_when_storing_then_size_is_total_bytes() {
    let (dir, store) = create_test_store();
    let path = StoragePath::staged_import(&ImportJobId::new());

    let chunks = vec![Ok(Bytes::from("title,author\n")), Ok(Bytes::from("a,b\n"))];
    let size = store
        .store(&path, Box::pin(stream::iter(chunks)), None)
        .await
        .unwrap();

    assert_eq!(size, 17);
    let on_disk = std::fs::metadata(dir.path().join(path.as_str())).unwrap();
    assert_eq!(on_disk.len(), 17);
}

#[tokio::test]
async fn given_staged_file_when_opening_then_reader_yields_original_bytes() {
    let (_dir, store) = create_test_store();
    let path = StoragePath::staged_import(&ImportJobId::new());
    stage(&store, &path, "title\nRust\n").await;

    let mut reader = store.open(&path).await.unwrap();
    let content = tokio::task::spawn_blocking(move || {
        let mut buf = String::new();
        reader.read_to_string(&mut buf).map(|_| buf)
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(content, "title\nRust\n");
}

#[tokio::test]
async fn given_missing_file_when_opening_then_not_found() {
    let (_dir, store) = create_test_store();
    let path = StoragePath::staged_import(&ImportJobId::new());

    let result = store.open(&path).await;

    assert!(matches!(result, Err(StagingStoreError::NotFound(_))));
}

#[tokio::test]
async fn given_deleted_file_when_deleting_again_then_succeeds() {
    let (dir, store) = create_test_store();
    let path = StoragePath::staged_import(&ImportJobId::new());
    stage(&store, &path, "data").await;

    store.delete(&path).await.unwrap();
    store.delete(&path).await.unwrap();

    assert!(!dir.path().join(path.as_str()).exists());
}

#[tokio::test]
async fn given_mixed_files_when_listing_staged_imports_then_only_staged_imports_returned() {
    let (_dir, store) = create_test_store();
    let staged = StoragePath::staged_import(&ImportJobId::new());
    stage(&store, &staged, "a").await;
    stage(&store, &StoragePath::from_raw("notes.txt"), "b").await;

    let listed = store.list_staged_imports().await.unwrap();

    assert_eq!(listed, vec![staged]);
}

#[tokio::test]
async fn given_stream_error_when_storing_then_returns_io_error() {
    let (_dir, store) = create_test_store();
    let path = StoragePath::staged_import(&ImportJobId::new());

    let chunks: Vec<Result<Bytes, io::Error>> = vec![
        Ok(Bytes::from("partial")),
        Err(io::Error::new(io::ErrorKind::ConnectionReset, "client went away")),
    ];
    let result = store
        .store(&path, Box::pin(stream::iter(chunks)), None)
        .await;

    assert!(matches!(result, Err(StagingStoreError::Io(_))));
}

#[tokio::test]
async fn given_upload_still_streaming_when_listing_then_part_file_is_listed_and_deletable() {
    let (dir, store) = create_test_store();
    let store = std::sync::Arc::new(store);
    let path = StoragePath::staged_import(&ImportJobId::new());

    let writer = {
        let store = store.clone();
        let path = path.clone();
        tokio::spawn(async move {
            let first_chunk = async { Ok::<_, io::Error>(Bytes::from("title,author\n")) };
            let upload = stream::once(first_chunk).chain(stream::pending()).boxed();
            store.store(&path, upload, None).await
        })
    };
    let part_file = dir.path().join(format!("{}#1", path.as_str()));
    tokio::time::timeout(Duration::from_secs(5), async {
        while !part_file.exists() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    let listed = store.list_staged_imports().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].as_str().starts_with(path.as_str()));

    store.delete(&listed[0]).await.unwrap();
    assert!(!part_file.exists());
    writer.abort();
}
