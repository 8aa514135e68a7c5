//! Client configuration

use std::path::PathBuf;

/// Environment variable overriding the API base URL
pub const API_URL_ENV: &str = "BODEGA_API_URL";

/// Default API base URL when nothing is configured
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Client configuration for connecting to the retail API
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL including the API prefix
    /// (e.g. "http://localhost:5000/api")
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Path of the persisted credential file
    pub credential_path: PathBuf,
}

impl ClientConfig {
    /// Create a new configuration with an explicit base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: 30,
            credential_path: default_credential_path(),
        }
    }

    /// Create a configuration from the environment, falling back to
    /// the default local API
    pub fn from_env() -> Self {
        let base_url =
            std::env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::new(base_url)
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set the credential file path
    pub fn with_credential_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credential_path = path.into();
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

fn default_credential_path() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".bodega")
        .join("credentials.json")
}
