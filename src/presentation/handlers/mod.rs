mod health;
mod import;
mod import_status;
pub mod problem;

pub use health::health_handler;
pub use import::{IMPORT_CSV_PATH, IMPORT_STATUS_PATH, ImportInitResponse, import_csv_handler};
pub use import_status::{ImportStatusResponse, import_status_handler};
