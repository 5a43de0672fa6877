/// Configuration for tracing initialization.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub environment: String,
    pub json_format: bool,
    /// Filter used when `RUST_LOG` is not set.
    pub default_filter: String,
}

impl TracingConfig {
    pub fn new(environment: impl Into<String>, level: &str, json_format: bool) -> Self {
        Self {
            environment: environment.into(),
            json_format,
            default_filter: format!("{level},talk_catalog=debug,tower_http=debug"),
        }
    }
}
