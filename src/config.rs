//! Settings files
//!
//! Client settings can be kept in a YAML or JSON file and turned into a
//! [`ClientConfig`]. Every field is optional and falls back to the library
//! default.
//!
//! ```yaml
//! page_size: 100
//! total_limit: 1000
//! rate_limit:
//!   min_interval_ms: 3000
//! retry:
//!   max_attempts: 5
//!   delay_ms: 500
//!   backoff: exponential
//! http:
//!   timeout_seconds: 60
//! ```

use crate::client::{
    ClientConfig, DEFAULT_MAX_ATTEMPTS, DEFAULT_MIN_REQUEST_INTERVAL, DEFAULT_PAGE_SIZE,
    DEFAULT_RETRY_DELAY,
};
use crate::error::{Error, Result};
use crate::http::{HttpConfig, RetryPolicy, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::types::BackoffType;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Top-Level Settings
// ============================================================================

/// Contents of a settings file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Items per request
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Cap on items an iterator yields (0 = unlimited)
    #[serde(default)]
    pub total_limit: usize,

    #[serde(default)]
    pub rate_limit: RateLimitSettings,

    #[serde(default)]
    pub retry: RetrySettings,

    #[serde(default)]
    pub http: HttpSettings,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            total_limit: 0,
            rate_limit: RateLimitSettings::default(),
            retry: RetrySettings::default(),
            http: HttpSettings::default(),
        }
    }
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

// ============================================================================
// Sections
// ============================================================================

/// Client-side throttling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitSettings {
    /// Minimum milliseconds between request starts (0 disables throttling)
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            min_interval_ms: default_min_interval_ms(),
        }
    }
}

fn default_min_interval_ms() -> u64 {
    DEFAULT_MIN_REQUEST_INTERVAL.as_millis() as u64
}

/// Retry behaviour for transient failures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Attempts per request, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base delay in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    #[serde(default)]
    pub backoff: BackoffType,

    /// Upper bound for any single delay, in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_delay_ms(),
            backoff: BackoffType::default(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_delay_ms() -> u64 {
    DEFAULT_RETRY_DELAY.as_millis() as u64
}

fn default_max_delay_ms() -> u64 {
    60_000
}

/// Endpoint and transport settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Custom user agent
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            user_agent: None,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

// ============================================================================
// Loading
// ============================================================================

impl ClientSettings {
    /// Load settings from a `.yaml`, `.yml` or `.json` file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read settings file '{}': {e}",
                path.display()
            ))
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        // An empty document means "all defaults"
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Failed to parse settings YAML: {e}")))
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::config(format!("Failed to parse settings JSON: {e}")))
    }

    /// Convert into a normalized [`ClientConfig`]
    pub fn to_client_config(&self) -> ClientConfig {
        let defaults = HttpConfig::default();
        let http = HttpConfig {
            base_url: self.http.base_url.clone(),
            timeout: Duration::from_secs(self.http.timeout_seconds),
            user_agent: self
                .http
                .user_agent
                .clone()
                .unwrap_or(defaults.user_agent),
        };

        let retry = RetryPolicy::fixed(
            self.retry.max_attempts,
            Duration::from_millis(self.retry.delay_ms),
        )
        .with_backoff(
            self.retry.backoff,
            Duration::from_millis(self.retry.max_delay_ms),
        );

        ClientConfig {
            page_size: self.page_size,
            total_limit: self.total_limit,
            min_request_interval: Duration::from_millis(self.rate_limit.min_interval_ms),
            retry,
            http,
        }
        .normalized()
    }
}

impl From<ClientSettings> for ClientConfig {
    fn from(settings: ClientSettings) -> Self {
        settings.to_client_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    fn temp_with_suffix(suffix: &str) -> NamedTempFile {
        Builder::new().suffix(suffix).tempfile().unwrap()
    }

    #[test]
    fn test_defaults_match_client_defaults() {
        let config = ClientSettings::default().to_client_config();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_empty_yaml_is_all_defaults() {
        assert_eq!(
            ClientSettings::from_yaml_str("").unwrap(),
            ClientSettings::default()
        );
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r"
page_size: 100
retry:
  backoff: exponential
  delay_ms: 250
http:
  timeout_seconds: 5
";
        let settings = ClientSettings::from_yaml_str(yaml).unwrap();
        assert_eq!(settings.page_size, 100);
        assert_eq!(settings.retry.max_attempts, 3);
        assert_eq!(settings.rate_limit.min_interval_ms, 1000);

        let config = settings.to_client_config();
        assert_eq!(config.retry.backoff, BackoffType::Exponential);
        assert_eq!(config.retry.delay, Duration::from_millis(250));
        assert_eq!(config.http.timeout, Duration::from_secs(5));
        assert_eq!(config.http.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_zero_values_normalized() {
        let yaml = r#"
page_size: 0
rate_limit:
  min_interval_ms: 0
retry:
  max_attempts: 0
  delay_ms: 0
http:
  timeout_seconds: 0
  user_agent: ""
"#;
        let config: ClientConfig = ClientSettings::from_yaml_str(yaml).unwrap().into();
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.retry.max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert_eq!(config.retry.delay, DEFAULT_RETRY_DELAY);
        assert_eq!(config.http.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.http.user_agent, HttpConfig::default().user_agent);
        assert_eq!(config.min_request_interval, Duration::ZERO);
    }

    #[test]
    fn test_invalid_yaml() {
        let err = ClientSettings::from_yaml_str("page_size: [1, 2").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_from_json_file() {
        let mut file = temp_with_suffix(".json");
        write!(
            file,
            r#"{{"total_limit": 42, "http": {{"user_agent": "bot/1.0"}}}}"#
        )
        .unwrap();

        let settings = ClientSettings::from_file(file.path()).unwrap();
        assert_eq!(settings.total_limit, 42);
        assert_eq!(settings.to_client_config().http.user_agent, "bot/1.0");
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = temp_with_suffix(".yaml");
        writeln!(file, "total_limit: 7").unwrap();

        let settings = ClientSettings::from_file(file.path()).unwrap();
        assert_eq!(settings.total_limit, 7);
    }

    #[test]
    fn test_missing_file() {
        let err = ClientSettings::from_file("/definitely/not/here.yaml").unwrap_err();
        assert!(err.to_string().contains("Failed to read settings file"));
    }
}
