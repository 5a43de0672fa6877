mod import_job_repository;
mod repository_error;
mod staging_store;
mod talk_repository;

pub use import_job_repository::ImportJobRepository;
pub use repository_error::RepositoryError;
pub use staging_store::{StagedReader, StagingStore, StagingStoreError};
pub use talk_repository::TalkRepository;
