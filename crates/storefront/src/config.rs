//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `BOOKBARN_API_URL` - Backend base URL (default: `http://localhost:8080`)
//! - `BOOKBARN_SESSION_FILE` - Where the session is persisted
//!   (default: `$HOME/.bookbarn/session.json`)
//! - `BOOKBARN_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `BOOKBARN_CURRENCY` - Currency for payment intents (default: EUR)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use bookbarn_core::CurrencyCode;
use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const SESSION_DIR: &str = ".bookbarn";
const SESSION_FILE: &str = "session.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Cannot determine session file location: set BOOKBARN_SESSION_FILE or HOME")]
    NoSessionLocation,
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL; endpoint paths are appended to it.
    pub api_url: Url,
    /// JSON file holding the persisted session.
    pub session_file: PathBuf,
    /// Timeout applied to every request.
    pub timeout: Duration,
    /// Currency used when creating payment intents.
    pub currency: CurrencyCode,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production", "staging")
    pub sentry_environment: Option<String>,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but malformed, or if no
    /// session file location can be derived.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = parse_api_url(&get_env_or_default("BOOKBARN_API_URL", DEFAULT_API_URL))?;

        let session_file = match get_optional_env("BOOKBARN_SESSION_FILE") {
            Some(path) => PathBuf::from(path),
            None => default_session_file()?,
        };

        let timeout_secs = get_env_or_default("BOOKBARN_TIMEOUT_SECS", "30")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("BOOKBARN_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        let currency = get_env_or_default("BOOKBARN_CURRENCY", "EUR")
            .parse::<CurrencyCode>()
            .map_err(|e| ConfigError::InvalidEnvVar("BOOKBARN_CURRENCY".to_string(), e))?;

        Ok(Self {
            api_url,
            session_file,
            timeout: Duration::from_secs(timeout_secs),
            currency,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration pointing at `api_url` with defaults for everything else.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `api_url` is not an absolute http(s) URL.
    pub fn for_api_url(api_url: &str, session_file: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_api_url(api_url)?,
            session_file: session_file.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            currency: CurrencyCode::default(),
            sentry_dsn: None,
            sentry_environment: None,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse and validate the backend base URL.
fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar("BOOKBARN_API_URL".to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "BOOKBARN_API_URL".to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            "BOOKBARN_API_URL".to_string(),
            "URL cannot be used as a base".to_string(),
        ));
    }

    Ok(url)
}

/// `$HOME/.bookbarn/session.json`.
fn default_session_file() -> Result<PathBuf, ConfigError> {
    let home = get_optional_env("HOME")
        .or_else(|| get_optional_env("USERPROFILE"))
        .ok_or(ConfigError::NoSessionLocation)?;
    Ok(PathBuf::from(home).join(SESSION_DIR).join(SESSION_FILE))
}

/// Get an optional, non-empty environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_api_url_accepts_http() {
        let url = parse_api_url("http://localhost:8080").unwrap();
        assert_eq!(url.host_str(), Some("localhost"));
        assert_eq!(url.port(), Some(8080));

        let url = parse_api_url(" https://shop.example.com/api/ ").unwrap();
        assert_eq!(url.path(), "/api/");
    }

    #[test]
    fn test_parse_api_url_rejects_other_schemes() {
        let err = parse_api_url("ftp://example.com").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
        assert!(parse_api_url("not a url").is_err());
        assert!(parse_api_url("mailto:shop@example.com").is_err());
    }

    #[test]
    fn test_for_api_url_defaults() {
        let config = ClientConfig::for_api_url("http://127.0.0.1:9000", "/tmp/session.json").unwrap();
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.currency, CurrencyCode::EUR);
        assert_eq!(config.session_file, PathBuf::from("/tmp/session.json"));
        assert!(config.sentry_dsn.is_none());
    }
}
