mod in_memory_repository;
mod pg_import_job_repository;
mod pg_talk_repository;

pub use in_memory_repository::{InMemoryImportJobRepository, InMemoryTalkRepository};
pub use pg_import_job_repository::PgImportJobRepository;
pub use pg_talk_repository::PgTalkRepository;
