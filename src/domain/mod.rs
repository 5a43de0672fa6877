mod import_job;
mod import_job_id;
mod import_status;
mod storage_path;
mod talk;

pub use import_job::ImportJob;
pub use import_job_id::ImportJobId;
pub use import_status::ImportStatus;
pub use storage_path::{STAGED_IMPORT_PREFIX, StoragePath};
pub use talk::{
    MAX_AUTHOR_CHARS, MAX_LINK_CHARS, MAX_TITLE_CHARS, TalkCsvRecord, TalkRecordError,
    TalkRequest, YearMonth,
};
