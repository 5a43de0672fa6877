use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use crate::application::ports::{RepositoryError, TalkRepository};
use crate::domain::TalkRequest;

/// Postgres caps bind parameters at 65535; seven per row.
const MAX_ROWS_PER_STATEMENT: usize = 5_000;

pub struct PgTalkRepository {
    pool: PgPool,
}

impl PgTalkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TalkRepository for PgTalkRepository {
    #[instrument(skip(self, talks), fields(count = talks.len()))]
    async fn create_many(&self, talks: &[TalkRequest]) -> Result<(), RepositoryError> {
        if talks.is_empty() {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        for chunk in talks.chunks(MAX_ROWS_PER_STATEMENT) {
            let mut builder = QueryBuilder::<Postgres>::new(
                "INSERT INTO talks (title, author, year_value, month_value, views, likes, link) ",
            );
            builder.push_values(chunk, |mut row, talk| {
                row.push_bind(talk.title.clone())
                    .push_bind(talk.author.clone())
                    .push_bind(talk.date.year())
                    .push_bind(talk.date.month() as i32)
                    .push_bind(talk.views)
                    .push_bind(talk.likes)
                    .push_bind(talk.link.clone());
            });

            builder
                .build()
                .execute(&mut *tx)
                .await
                .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        tracing::debug!(count = talks.len(), "Batch created talks");
        Ok(())
    }
}
