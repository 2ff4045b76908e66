//! Storefront client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `SHOPFRONT_API_URL` - Base URL of the remote API (default: `http://localhost:5000`)
//! - `SHOPFRONT_STATE_DIR` - Directory holding persisted session state (default: `.shopfront`)
//! - `SHOPFRONT_PAGE_LIMIT` - Products per listing page (default: 8)
//! - `SHOPFRONT_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `SHOPFRONT_API_TOKEN` - Static bearer token for deployments without per-user tokens
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:5000";
const DEFAULT_STATE_DIR: &str = ".shopfront";
const DEFAULT_PAGE_LIMIT: u32 = 8;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL of the remote REST API
    pub api_url: Url,
    /// Directory for persisted session state
    pub state_dir: PathBuf,
    /// Products requested per listing page
    pub page_limit: u32,
    /// Timeout applied to every remote call
    pub request_timeout: Duration,
    /// Static bearer token, used when the identity carries none
    pub api_token: Option<SecretString>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production", "staging")
    pub sentry_environment: Option<String>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_url", &self.api_url.as_str())
            .field("state_dir", &self.state_dir)
            .field("page_limit", &self.page_limit)
            .field("request_timeout", &self.request_timeout)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("sentry_dsn", &self.sentry_dsn)
            .field("sentry_environment", &self.sentry_environment)
            .finish()
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = parse_api_url(&get_env_or_default("SHOPFRONT_API_URL", DEFAULT_API_URL))?;
        let state_dir = PathBuf::from(get_env_or_default("SHOPFRONT_STATE_DIR", DEFAULT_STATE_DIR));
        let page_limit = parse_positive::<u32>(
            "SHOPFRONT_PAGE_LIMIT",
            get_optional_env("SHOPFRONT_PAGE_LIMIT"),
            DEFAULT_PAGE_LIMIT,
        )?;
        let timeout_secs = parse_positive::<u64>(
            "SHOPFRONT_REQUEST_TIMEOUT_SECS",
            get_optional_env("SHOPFRONT_REQUEST_TIMEOUT_SECS"),
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;

        Ok(Self {
            api_url,
            state_dir,
            page_limit,
            request_timeout: Duration::from_secs(timeout_secs),
            api_token: get_optional_env("SHOPFRONT_API_TOKEN").map(SecretString::from),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration pointing at `api_url` with every other setting defaulted.
    ///
    /// # Errors
    ///
    /// Returns an error if `api_url` is not an absolute http(s) URL.
    pub fn for_api(api_url: &str, state_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_api_url(api_url)?,
            state_dir: state_dir.into(),
            page_limit: DEFAULT_PAGE_LIMIT,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            api_token: None,
            sentry_dsn: None,
            sentry_environment: None,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse the API base URL, requiring an http(s) scheme.
fn parse_api_url(value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar("SHOPFRONT_API_URL".to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "SHOPFRONT_API_URL".to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

/// Parse an optional positive integer, falling back to `default` when unset.
fn parse_positive<T>(key: &str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + From<u8>,
    T::Err: std::fmt::Display,
{
    let Some(raw) = value else {
        return Ok(default);
    };
    let parsed = raw
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if parsed < T::from(1) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be at least 1".to_string(),
        ));
    }
    Ok(parsed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_api_url_accepts_http() {
        let url = parse_api_url("https://shop.example.com").unwrap();
        assert_eq!(url.host_str(), Some("shop.example.com"));
    }

    #[test]
    fn test_parse_api_url_rejects_other_schemes() {
        assert!(parse_api_url("ftp://shop.example.com").is_err());
        assert!(parse_api_url("not a url").is_err());
    }

    #[test]
    fn test_parse_positive_default_when_unset() {
        assert_eq!(parse_positive::<u32>("K", None, 8).unwrap(), 8);
    }

    #[test]
    fn test_parse_positive_rejects_zero_and_garbage() {
        assert!(parse_positive::<u32>("K", Some("0".to_string()), 8).is_err());
        assert!(parse_positive::<u32>("K", Some("eight".to_string()), 8).is_err());
        assert_eq!(parse_positive::<u64>("K", Some(" 30 ".to_string()), 10).unwrap(), 30);
    }

    #[test]
    fn test_for_api_defaults() {
        let config = ClientConfig::for_api("http://127.0.0.1:5000", "/tmp/state").unwrap();
        assert_eq!(config.page_limit, 8);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_debug_redacts_token() {
        let mut config = ClientConfig::for_api("http://127.0.0.1:5000", "/tmp/state").unwrap();
        config.api_token = Some(SecretString::from("super_secret_token_value"));

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_token_value"));
    }
}
