//! Proxy settings read from unprefixed environment variables.

use serde::Deserialize;

/// Proxy configuration loaded from environment variables.
///
/// Upstream credentials live only here, on the server side.
#[derive(Deserialize, Clone)]
pub struct Config {
    /// Bind host (default: 127.0.0.1)
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port (default: 3000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Upstream base URL, `API_BASE_URL` (default: https://api.climatiq.io)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Upstream bearer token, `API_KEY` (default: empty)
    #[serde(default)]
    pub api_key: String,

    /// Log level (default: info)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format: "json" or "pretty" (default: pretty)
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_api_base_url() -> String {
    climatiq_core::config::DEFAULT_API_URL.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("api_base_url", &self.api_base_url)
            .field("api_key", &"<redacted>")
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// Variables are uppercase with underscore separators: `API_BASE_URL`,
    /// `API_KEY`, `LOG_LEVEL`, ... This runs on every proxied request, so it
    /// does not touch `.env`; call [`Config::load_dotenv`] once at startup.
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    /// Merge a `.env` file into the process environment, if one exists.
    /// Variables that are already set win.
    pub fn load_dotenv() {
        dotenvy::dotenv().ok();
    }

    pub fn from_vars<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(vars)
    }
}
