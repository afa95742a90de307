use crate::presentation::config::{Environment, LoggingSettings};

/// Subscriber options resolved from the logging section.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub environment: String,
    pub default_filter: String,
    pub json_format: bool,
}

impl TracingConfig {
    pub fn from_settings(environment: &Environment, logging: &LoggingSettings) -> Self {
        Self {
            environment: environment.as_str().to_string(),
            default_filter: logging.level.clone(),
            json_format: logging.enable_json
                || std::env::var("LOG_FORMAT")
                    .map(|v| v.eq_ignore_ascii_case("json"))
                    .unwrap_or(false),
        }
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            environment: "local".to_string(),
            default_filter: LoggingSettings::default().level,
            json_format: false,
        }
    }
}
