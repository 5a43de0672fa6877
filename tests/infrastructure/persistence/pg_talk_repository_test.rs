use talk_catalog::application::ports::TalkRepository;
use talk_catalog::domain::{TalkRequest, YearMonth};

use crate::helpers::TestPostgres;

fn talk(n: usize) -> TalkRequest {
    TalkRequest {
        title: format!("Talk {n}"),
        author: "Ann".to_string(),
        date: YearMonth::new(2021, 12).unwrap(),
        views: n as i64,
        likes: 0,
        link: format!("https://talks.example/{n}"),
    }
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn given_batch_when_creating_many_then_rows_are_inserted() {
    let test_pg = TestPostgres::new().await;
    let batch: Vec<_> = (0..3).map(talk).collect();

    test_pg.talk_repository.create_many(&batch).await.unwrap();

    let rows: Vec<(String, i32, i32, i64)> = sqlx::query_as(
        "SELECT title, year_value, month_value, views FROM talks ORDER BY id",
    )
    .fetch_all(&test_pg.pool)
    .await
    .unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2], ("Talk 2".to_string(), 2021, 12, 2));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn given_batch_larger_than_one_statement_when_creating_many_then_all_rows_inserted() {
    let test_pg = TestPostgres::new().await;
    let batch: Vec<_> = (0..12_000).map(talk).collect();

    test_pg.talk_repository.create_many(&batch).await.unwrap();

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM talks")
        .fetch_one(&test_pg.pool)
        .await
        .unwrap();
    assert_eq!(count, 12_000);
}
