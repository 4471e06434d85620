use std::env;

use thiserror::Error;

use crate::constants;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("GOOGLE_API_KEY is not set; export it or add it to a .env file")]
    MissingApiKey,
}

/// Startup configuration, read from the environment once and shared read-only
/// afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
}

impl Config {
    /// Loads the configuration. A missing or blank `GOOGLE_API_KEY` is a fatal
    /// startup condition; model and API base fall back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = env::var("GOOGLE_API_KEY").unwrap_or_default();
        if api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }

        Ok(Self {
            api_key,
            model: constants::TAGVI_MODEL.clone(),
            api_base: constants::GEMINI_API_BASE.clone(),
        })
    }
}
