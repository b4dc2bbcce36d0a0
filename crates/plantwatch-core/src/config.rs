//! Relay configuration management.
//!
//! Configuration is sourced from the environment. The binary loads a `.env`
//! file first (via `dotenvy`), so the same variables can live there:
//!
//! - `THINGSBOARD_URL`: ThingsBoard base URL (default `http://localhost:8080`)
//! - `THINGSBOARD_USERNAME` / `THINGSBOARD_PASSWORD`: tenant admin login
//! - `THINGSBOARD_DEVICE_ID`: default target device
//! - `THINGSBOARD_TIMEOUT_SECS`: per-request timeout (default 10)

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Default ThingsBoard base URL for a local install
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// HTTP request timeout in seconds for every ThingsBoard call.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

const ENV_URL: &str = "THINGSBOARD_URL";
const ENV_USERNAME: &str = "THINGSBOARD_USERNAME";
const ENV_PASSWORD: &str = "THINGSBOARD_PASSWORD";
const ENV_DEVICE_ID: &str = "THINGSBOARD_DEVICE_ID";
const ENV_TIMEOUT: &str = "THINGSBOARD_TIMEOUT_SECS";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    MissingCredential(&'static str),

    #[error("no device_id provided and THINGSBOARD_DEVICE_ID is not set")]
    MissingTarget,

    #[error("invalid device id '{0}': must be a single path segment")]
    InvalidDeviceId(String),

    #[error("invalid base URL '{0}': must start with http:// or https://")]
    InvalidBaseUrl(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),

    #[error("invalid THINGSBOARD_TIMEOUT_SECS '{0}': expected a positive number of seconds")]
    InvalidTimeout(String),
}

#[derive(Clone)]
pub struct RelayConfig {
    pub base_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub default_device_id: Option<String>,
    pub request_timeout: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            username: None,
            password: None,
            default_device_id: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("default_device_id", &self.default_device_id)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl RelayConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    /// Empty or whitespace-only values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let base_url = normalize_base_url(&get(ENV_URL).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()))?;

        let request_timeout = match get(ENV_TIMEOUT) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::InvalidTimeout(raw)),
            },
            None => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        };

        Ok(Self {
            base_url,
            username: get(ENV_USERNAME),
            password: get(ENV_PASSWORD),
            default_device_id: get(ENV_DEVICE_ID),
            request_timeout,
        })
    }

    /// Service credentials for the login exchange.
    /// Missing credentials are a configuration error, never retried.
    pub fn service_credentials(&self) -> Result<(&str, &str), ConfigError> {
        let username = self
            .username
            .as_deref()
            .ok_or(ConfigError::MissingCredential(ENV_USERNAME))?;
        let password = self
            .password
            .as_deref()
            .ok_or(ConfigError::MissingCredential(ENV_PASSWORD))?;
        Ok((username, password))
    }

    /// Pick the device to address: the caller's id when non-empty,
    /// otherwise the configured default.
    pub fn resolve_target(&self, device_id: Option<&str>) -> Result<String, ConfigError> {
        device_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .or_else(|| {
                self.default_device_id
                    .as_deref()
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
            })
            .ok_or(ConfigError::MissingTarget)
            .and_then(validate_device_id)
    }
}

/// Device ids become one URL path segment; anything that could address a
/// different endpoint is rejected.
fn validate_device_id(id: &str) -> Result<String, ConfigError> {
    let unsafe_char = |c: char| matches!(c, '/' | '\\' | '?' | '#' | '%') || c.is_control();
    if id == "." || id == ".." || id.chars().any(unsafe_char) {
        return Err(ConfigError::InvalidDeviceId(id.to_string()));
    }
    Ok(id.to_string())
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidBaseUrl(raw.to_string()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_env_empty() {
        let config = RelayConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert!(config.username.is_none());
        assert!(config.default_device_id.is_none());
    }

    #[test]
    fn test_reads_all_variables() {
        let config = RelayConfig::from_lookup(lookup(&[
            ("THINGSBOARD_URL", "https://tb.example.com/"),
            ("THINGSBOARD_USERNAME", "tenant@example.com"),
            ("THINGSBOARD_PASSWORD", "secret"),
            ("THINGSBOARD_DEVICE_ID", "dev-123"),
            ("THINGSBOARD_TIMEOUT_SECS", "3"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "https://tb.example.com");
        assert_eq!(config.service_credentials().unwrap(), ("tenant@example.com", "secret"));
        assert_eq!(config.default_device_id.as_deref(), Some("dev-123"));
        assert_eq!(config.request_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = RelayConfig::from_lookup(lookup(&[
            ("THINGSBOARD_USERNAME", "   "),
            ("THINGSBOARD_DEVICE_ID", ""),
        ]))
        .unwrap();
        assert!(config.username.is_none());
        assert!(config.default_device_id.is_none());
    }

    #[test]
    fn test_invalid_base_url() {
        let err = RelayConfig::from_lookup(lookup(&[("THINGSBOARD_URL", "localhost:8080")])).unwrap_err();
        assert_eq!(err, ConfigError::InvalidBaseUrl("localhost:8080".into()));
    }

    #[test]
    fn test_invalid_timeout() {
        let err = RelayConfig::from_lookup(lookup(&[("THINGSBOARD_TIMEOUT_SECS", "0")])).unwrap_err();
        assert_eq!(err, ConfigError::InvalidTimeout("0".into()));

        let err = RelayConfig::from_lookup(lookup(&[("THINGSBOARD_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert_eq!(err, ConfigError::InvalidTimeout("soon".into()));
    }

    #[test]
    fn test_missing_credentials() {
        let mut config = RelayConfig::default();
        assert_eq!(
            config.service_credentials().unwrap_err(),
            ConfigError::MissingCredential("THINGSBOARD_USERNAME")
        );

        config.username = Some("tenant@example.com".into());
        assert_eq!(
            config.service_credentials().unwrap_err(),
            ConfigError::MissingCredential("THINGSBOARD_PASSWORD")
        );
    }

    #[test]
    fn test_resolve_target() {
        let mut config = RelayConfig::default();
        assert_eq!(config.resolve_target(Some("dev-1")).unwrap(), "dev-1");
        assert_eq!(config.resolve_target(Some("  ")).unwrap_err(), ConfigError::MissingTarget);
        assert_eq!(config.resolve_target(None).unwrap_err(), ConfigError::MissingTarget);

        config.default_device_id = Some("dev-default".into());
        assert_eq!(config.resolve_target(None).unwrap(), "dev-default");
        assert_eq!(config.resolve_target(Some("")).unwrap(), "dev-default");
        assert_eq!(config.resolve_target(Some("dev-1")).unwrap(), "dev-1");
    }

    #[test]
    fn test_resolve_target_rejects_path_tricks() {
        let config = RelayConfig::default();
        for id in ["../../../auth/logout", "..", ".", "dev/1", "dev?x=1", "dev#frag", "dev%2F1", "dev\\1"] {
            assert_eq!(
                config.resolve_target(Some(id)).unwrap_err(),
                ConfigError::InvalidDeviceId(id.to_string()),
                "{} should be rejected",
                id
            );
        }

        // ThingsBoard ids are UUIDs; dots and dashes inside a name are fine
        let id = "784f394c-42b6-435a-983c-b7beff2784f9";
        assert_eq!(config.resolve_target(Some(id)).unwrap(), id);
        assert_eq!(config.resolve_target(Some("dev.v2")).unwrap(), "dev.v2");
    }

    #[test]
    fn test_configured_default_is_validated() {
        let config = RelayConfig {
            default_device_id: Some("../admin".into()),
            ..RelayConfig::default()
        };
        assert_eq!(
            config.resolve_target(None).unwrap_err(),
            ConfigError::InvalidDeviceId("../admin".into())
        );
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = RelayConfig {
            password: Some("hunter2".into()),
            ..RelayConfig::default()
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }
}
