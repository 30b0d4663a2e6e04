//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `WAREHOUSE_API_URL` - Base URL of the warehouse service (e.g., `https://warehouse.local/api`)
//!
//! ## Optional
//! - `WAREHOUSE_API_TOKEN` - Bearer token sent with every request
//! - `WAREHOUSE_USER_ID` - Authenticated user submitting dispatches
//! - `WAREHOUSE_TIMEOUT_SECS` - Request timeout in seconds (default: 30)

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use lotdispatch_core::UserId;

const DEFAULT_TIMEOUT_SECS: &str = "30";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Warehouse service client configuration.
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL; request paths are appended to it.
    pub base_url: Url,
    /// Optional bearer token.
    pub api_token: Option<SecretString>,
    /// Authenticated user for submissions.
    pub user_id: Option<UserId>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("user_id", &self.user_id)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClientConfig {
    /// Build a configuration for `base_url` with defaults for everything else.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL cannot be parsed.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("WAREHOUSE_API_URL", base_url)?,
            api_token: None,
            user_id: None,
            timeout: Duration::from_secs(30),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = parse_base_url("WAREHOUSE_API_URL", &get_required_env("WAREHOUSE_API_URL")?)?;
        let api_token = get_optional_env("WAREHOUSE_API_TOKEN").map(SecretString::from);
        let user_id = get_optional_env("WAREHOUSE_USER_ID")
            .map(|raw| {
                raw.parse::<UserId>().map_err(|e| {
                    ConfigError::InvalidEnvVar("WAREHOUSE_USER_ID".to_string(), e.to_string())
                })
            })
            .transpose()?;
        let timeout_secs = get_env_or_default("WAREHOUSE_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("WAREHOUSE_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        Ok(Self {
            base_url,
            api_token,
            user_id,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Set the bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(SecretString::from(token.into()));
        self
    }

    /// Set the submitting user.
    #[must_use]
    pub const fn with_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a base URL, making sure it ends with `/` so relative joins append.
fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut normalized = raw.trim().to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    let url = Url::parse(&normalized)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let config = ClientConfig::new("https://warehouse.local/api").unwrap();
        assert_eq!(config.base_url.as_str(), "https://warehouse.local/api/");
        assert_eq!(
            config.base_url.join("dispatches").unwrap().as_str(),
            "https://warehouse.local/api/dispatches"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let result = ClientConfig::new("not a url");
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        let result = ClientConfig::new("ftp://warehouse.local");
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_builders() {
        let config = ClientConfig::new("http://localhost:8080")
            .unwrap()
            .with_token("abc")
            .with_user(UserId::new(3));
        assert!(config.api_token.is_some());
        assert_eq!(config.user_id, Some(UserId::new(3)));
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = ClientConfig::new("http://localhost:8080")
            .unwrap()
            .with_token("super_secret_token_value");

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("localhost"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_token_value"));
    }
}
