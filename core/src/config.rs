//! Client settings read from `CLIMATIQ_*` environment variables.

use serde::Deserialize;

use crate::error::ApiError;

pub const DEFAULT_API_URL: &str = "https://api.climatiq.io";

/// Upstream location and credentials, read from `CLIMATIQ_*` environment
/// variables.
#[derive(Clone, Deserialize)]
pub struct ClimatiqConfig {
    /// `CLIMATIQ_API_URL` (default: https://api.climatiq.io)
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// `CLIMATIQ_API_KEY` (required)
    pub api_key: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl std::fmt::Debug for ClimatiqConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClimatiqConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl ClimatiqConfig {
    /// Load from the process environment, after merging a `.env` file if one
    /// exists.
    pub fn from_env() -> Result<Self, ApiError> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load from explicit `(KEY, value)` pairs using the same rules as `from_env`.
    pub fn from_vars<I>(vars: I) -> Result<Self, ApiError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed("CLIMATIQ_")
            .from_iter(vars)
            .map_err(|e| ApiError::Config(e.to_string()))
    }
}
