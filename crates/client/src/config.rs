//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `STOCKROOM_API_URL` - Base URL of the catalog API (default: `http://localhost:5000`)
//! - `STOCKROOM_SESSION_FILE` - Where the login session is persisted
//!   (default: `.stockroom/session.json`)
//! - `STOCKROOM_HTTP_TIMEOUT_SECS` - Per-request timeout in seconds (default: 30)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:5000";
const DEFAULT_SESSION_FILE: &str = ".stockroom/session.json";
const DEFAULT_HTTP_TIMEOUT_SECS: &str = "30";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Stockroom client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every API path is joined onto
    pub api_url: Url,
    /// Session file used as persistent token storage
    pub session_file: PathBuf,
    /// Timeout applied to each HTTP request
    pub http_timeout: Duration,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = parse_api_url(&get_env_or_default("STOCKROOM_API_URL", DEFAULT_API_URL))?;
        let session_file = PathBuf::from(get_env_or_default(
            "STOCKROOM_SESSION_FILE",
            DEFAULT_SESSION_FILE,
        ));
        let http_timeout = get_env_or_default(
            "STOCKROOM_HTTP_TIMEOUT_SECS",
            DEFAULT_HTTP_TIMEOUT_SECS,
        )
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| {
            ConfigError::InvalidEnvVar("STOCKROOM_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
        })?;

        Ok(Self {
            api_url,
            session_file,
            http_timeout,
        })
    }

    /// Configuration pointing at `api_url` with default timeout and session path.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `api_url` is not an absolute http(s) URL.
    pub fn for_api_url(api_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_api_url(api_url)?,
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
            http_timeout: Duration::from_secs(30),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an environment variable or a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an API base URL, normalising it to end with `/` so relative
/// joins keep any path prefix.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` unless `raw` is an http(s) URL.
pub fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |msg: String| ConfigError::InvalidEnvVar("STOCKROOM_API_URL".to_string(), msg);

    let mut url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", url.scheme())));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
