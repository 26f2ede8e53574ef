//! Environment-based HTTP configuration.
//!
//! Runtime knobs can be set without rebuilds:
//!
//! - `TASKBOARD_ENABLE_CORS` - enable permissive CORS (default: true)
//! - `TASKBOARD_ENABLE_OPENAPI` - serve the OpenAPI document (default: true)

use std::env;

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub enable_cors: bool,
    pub enable_openapi: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            enable_cors: true,
            enable_openapi: true,
        }
    }
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid environment variable '{key}': {message}")]
    InvalidEnvVar { key: String, message: String },
}

impl HttpConfig {
    /// Load configuration from the environment, falling back to defaults
    /// for unset variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.enable_cors = env_bool("TASKBOARD_ENABLE_CORS", config.enable_cors)?;
        config.enable_openapi = env_bool("TASKBOARD_ENABLE_OPENAPI", config.enable_openapi)?;
        Ok(config)
    }
}

fn env_bool(key: &str, default: bool) -> Result<bool, ConfigError> {
    match env::var(key) {
        Ok(raw) => match raw.to_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" => Ok(false),
            other => Err(ConfigError::InvalidEnvVar {
                key: key.to_string(),
                message: format!("expected a boolean, got '{other}'"),
            }),
        },
        Err(_) => Ok(default),
    }
}
