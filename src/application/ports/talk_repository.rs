use async_trait::async_trait;

use crate::domain::TalkRequest;

use super::RepositoryError;

/// Bulk write boundary for parsed talks. A batch is persisted whole or not at all.
#[async_trait]
pub trait TalkRepository: Send + Sync {
    async fn create_many(&self, talks: &[TalkRequest]) -> Result<(), RepositoryError>;
}
