use std::sync::Arc;

use crate::application::services::ImportService;
use crate::presentation::config::Settings;

#[derive(Clone)]
pub struct AppState {
    pub import_service: Arc<ImportService>,
    pub settings: Settings,
}
