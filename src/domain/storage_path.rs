use std::fmt;

use super::ImportJobId;

/// File name prefix shared by every staged import upload.
pub const STAGED_IMPORT_PREFIX: &str = "csv-import-";

const STAGED_IMPORT_SUFFIX: &str = ".csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePath(String);

impl StoragePath {
    pub fn staged_import(job_id: &ImportJobId) -> Self {
        Self(format!(
            "{}{}{}",
            STAGED_IMPORT_PREFIX,
            job_id.as_uuid(),
            STAGED_IMPORT_SUFFIX
        ))
    }

    pub fn from_raw(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the last path segment follows the staged import naming convention.
    pub fn is_staged_import(&self) -> bool {
        self.0
            .rsplit('/')
            .next()
            .is_some_and(|name| name.starts_with(STAGED_IMPORT_PREFIX))
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
