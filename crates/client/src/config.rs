//! Client configuration from the deployment environment.

use thiserror::Error;

/// Storage key consulted on web builds, where there is no process
/// environment; the deployment bootstrap writes the API origin here.
pub const BASE_URL_STORAGE_KEY: &str = "postboard_api_url";

/// Environment variable consulted on native builds.
pub const BASE_URL_ENV: &str = "POSTBOARD_API_URL";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The backend base URL is required configuration. There is deliberately
    /// no localhost fallback; a misconfigured deployment fails loudly instead
    /// of talking to a guessed host.
    #[error("backend base URL is not configured (set POSTBOARD_API_URL)")]
    MissingBaseUrl,
}

/// Deployment-provided client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: String,
}

impl Config {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ConfigError> {
        let base_url = base_url.into();
        if base_url.trim().is_empty() {
            return Err(ConfigError::MissingBaseUrl);
        }
        Ok(Self { base_url })
    }

    /// Read configuration from the deployment environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        match read_base_url() {
            Some(url) => Self::new(url),
            None => Err(ConfigError::MissingBaseUrl),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn read_base_url() -> Option<String> {
    std::env::var(BASE_URL_ENV).ok()
}

#[cfg(target_arch = "wasm32")]
fn read_base_url() -> Option<String> {
    crate::storage::load_raw(BASE_URL_STORAGE_KEY)
}
