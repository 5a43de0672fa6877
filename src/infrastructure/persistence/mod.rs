mod pg_pool;
mod repositories;

pub use repositories::InMemoryImportJobRepository;
pub use repositories::InMemoryTalkRepository;
pub use repositories::PgImportJobRepository;
pub use repositories::PgTalkRepository;

pub use pg_pool::create_pool;
