use config::Environment as EnvironmentSource;
use config::{Config, File};
use serde::Deserialize;

use crate::application::services::WorkerPoolConfig;

use super::Environment;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub storage: StorageSettings,
    pub import: ImportSettings,
    pub logging: LoggingSettings,
}

impl Settings {
    /// Layers `appsettings.{environment}` (optional) under `APP_*` variables,
    /// e.g. `APP_IMPORT__BATCH_SIZE=1000`.
    pub fn load(environment: Environment) -> Result<Self, SettingsError> {
        let settings: Settings = Config::builder()
            .add_source(
                File::with_name(&format!("appsettings.{}", environment.as_str())).required(false),
            )
            .add_source(
                EnvironmentSource::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        self.import.validate()?;
        if self.server.max_upload_mb == 0 {
            return Err(SettingsError::Invalid(
                "server.max_upload_mb must be at least 1".into(),
            ));
        }
        if self.database.provider == DatabaseProvider::Postgres && self.database.url.is_empty() {
            return Err(SettingsError::Invalid(
                "database.url is required for the postgres provider".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub max_upload_mb: usize,
    /// Prefix for status URLs handed back to clients; relative URLs when unset.
    pub public_base_url: Option<String>,
}

impl ServerSettings {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            max_upload_mb: 512,
            public_base_url: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseProvider {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub provider: DatabaseProvider,
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            provider: DatabaseProvider::Postgres,
            url: String::new(),
            max_connections: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub local_path: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            local_path: std::env::temp_dir()
                .join("talk-catalog-staging")
                .to_string_lossy()
                .into_owned(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Rows per bulk write.
    pub batch_size: usize,
    pub max_concurrent_imports: usize,
    /// Imports allowed to wait for a worker; zero means no backlog.
    pub import_queue_capacity: usize,
    /// Age after which a PROCESSING job found at startup is presumed orphaned.
    pub stale_after_minutes: i64,
    pub retry_after_seconds: u64,
}

impl ImportSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        let invalid = |msg: &str| Err(SettingsError::Invalid(msg.to_string()));
        if self.batch_size == 0 {
            return invalid("import.batch_size must be at least 1");
        }
        if self.max_concurrent_imports == 0 {
            return invalid("import.max_concurrent_imports must be at least 1");
        }
        if u32::try_from(self.max_concurrent_imports + self.import_queue_capacity).is_err() {
            return invalid("import pool capacity is too large");
        }
        if self.stale_after_minutes <= 0 {
            return invalid("import.stale_after_minutes must be positive");
        }
        if self.retry_after_seconds == 0 {
            return invalid("import.retry_after_seconds must be at least 1");
        }
        Ok(())
    }

    pub fn pool_config(&self) -> WorkerPoolConfig {
        WorkerPoolConfig {
            max_concurrent: self.max_concurrent_imports,
            queue_capacity: self.import_queue_capacity,
        }
    }

    pub fn stale_after(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.stale_after_minutes)
    }
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            batch_size: 500,
            max_concurrent_imports: 4,
            import_queue_capacity: 16,
            stale_after_minutes: 30,
            retry_after_seconds: 120,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub enable_json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            enable_json: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
