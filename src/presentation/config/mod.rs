mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    DatabaseProvider, DatabaseSettings, ImportSettings, LoggingSettings, ServerSettings,
    Settings, SettingsError, StorageSettings,
};
