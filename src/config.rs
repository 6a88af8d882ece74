//! Configuration types for analyzer-client

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Server endpoint paths, relative to [`Config::base_url`]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Task submission endpoint (default: "/api/analyze")
    #[serde(default = "default_analyze_path")]
    pub analyze_path: String,

    /// Task status endpoint, the task id is appended as a path segment (default: "/api/status")
    #[serde(default = "default_status_path")]
    pub status_path: String,

    /// Result export endpoint, the task id is appended as a path segment (default: "/api/export")
    #[serde(default = "default_export_path")]
    pub export_path: String,

    /// Conversion endpoint for the primary engine (default: "/api/convert")
    #[serde(default = "default_convert_path")]
    pub convert_path: String,

    /// Conversion endpoint for the alternate engine (default: "/api/convert_alt")
    #[serde(default = "default_convert_alternate_path")]
    pub convert_alternate_path: String,

    /// Password check endpoint (default: "/api/auth/check")
    #[serde(default = "default_auth_check_path")]
    pub auth_check_path: String,

    /// Password change endpoint (default: "/api/auth/change_password")
    #[serde(default = "default_change_password_path")]
    pub change_password_path: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            analyze_path: default_analyze_path(),
            status_path: default_status_path(),
            export_path: default_export_path(),
            convert_path: default_convert_path(),
            convert_alternate_path: default_convert_alternate_path(),
            auth_check_path: default_auth_check_path(),
            change_password_path: default_change_password_path(),
        }
    }
}

/// Polling cadence and request limits
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Fixed interval between status checks in milliseconds (default: 2000)
    ///
    /// There is no backoff, no jitter and no attempt limit: polling continues
    /// until the task reaches a terminal state.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Timeout applied to every HTTP request (default: 30 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            request_timeout: default_request_timeout(),
        }
    }
}

/// Naming of downloaded documents
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Suffix appended to the input file stem for converted documents (default: "_converted")
    #[serde(default = "default_converted_suffix")]
    pub converted_suffix: String,

    /// Extension of downloaded documents, without the dot (default: "docx")
    #[serde(default = "default_output_extension")]
    pub output_extension: String,

    /// Base name for exported analysis results (default: "analysis")
    #[serde(default = "default_export_basename")]
    pub export_basename: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            converted_suffix: default_converted_suffix(),
            output_extension: default_output_extension(),
            export_basename: default_export_basename(),
        }
    }
}

/// Log output format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Tracing subscriber settings, used by [`crate::logging::init`]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive, e.g. "info" or "analyzer_client=debug" (default: "info")
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format (default: text)
    #[serde(default)]
    pub format: LogFormat,

    /// Include event targets in output (default: true)
    #[serde(default = "default_true")]
    pub with_targets: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            with_targets: true,
        }
    }
}

/// Main configuration for the analyzer client
///
/// Sub-configs are flattened, so the serialized form is a single flat object
/// apart from `logging`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Server base URL (default: "http://127.0.0.1:5000")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Endpoint paths
    #[serde(flatten)]
    pub endpoints: EndpointConfig,

    /// Polling cadence and request timeout
    #[serde(flatten)]
    pub polling: PollingConfig,

    /// Downloaded document naming
    #[serde(flatten)]
    pub output: OutputConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            endpoints: EndpointConfig::default(),
            polling: PollingConfig::default(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Configuration pointing at the given server, everything else default
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Interval between status checks
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.polling.poll_interval_ms)
    }

    /// Check the configuration for values the clients cannot work with
    pub fn validate(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.base_url).map_err(|e| Error::Config {
            message: format!("invalid base URL '{}': {}", self.base_url, e),
            key: Some("base_url".to_string()),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(Error::Config {
                message: format!("base URL '{}' cannot carry paths", self.base_url),
                key: Some("base_url".to_string()),
            });
        }

        if self.polling.poll_interval_ms == 0 {
            return Err(Error::Config {
                message: "poll interval must be greater than zero".to_string(),
                key: Some("poll_interval_ms".to_string()),
            });
        }

        if self.polling.request_timeout.is_zero() {
            return Err(Error::Config {
                message: "request timeout must be greater than zero".to_string(),
                key: Some("request_timeout".to_string()),
            });
        }

        if self.output.output_extension.trim().is_empty() {
            return Err(Error::Config {
                message: "output extension must not be empty".to_string(),
                key: Some("output_extension".to_string()),
            });
        }

        Ok(())
    }

    /// Absolute URL for an endpoint path
    pub(crate) fn endpoint_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Absolute URL for an endpoint path with one encoded trailing segment
    pub(crate) fn endpoint_url_with_segment(&self, path: &str, segment: &str) -> String {
        format!(
            "{}/{}",
            self.endpoint_url(path).trim_end_matches('/'),
            urlencoding::encode(segment)
        )
    }

    /// Build the HTTP client shared by all requests of one client instance
    pub(crate) fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.polling.request_timeout)
            .build()
            .map_err(Error::Network)
    }
}

fn default_true() -> bool {
    true
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_analyze_path() -> String {
    "/api/analyze".to_string()
}

fn default_status_path() -> String {
    "/api/status".to_string()
}

fn default_export_path() -> String {
    "/api/export".to_string()
}

fn default_convert_path() -> String {
    "/api/convert".to_string()
}

fn default_convert_alternate_path() -> String {
    "/api/convert_alt".to_string()
}

fn default_auth_check_path() -> String {
    "/api/auth/check".to_string()
}

fn default_change_password_path() -> String {
    "/api/auth/change_password".to_string()
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_converted_suffix() -> String {
    "_converted".to_string()
}

fn default_output_extension() -> String {
    "docx".to_string()
}

fn default_export_basename() -> String {
    "analysis".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_server_conventions() {
        let config = Config::default();

        assert_eq!(config.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.poll_interval(), Duration::from_secs(2));
        assert_eq!(config.endpoints.analyze_path, "/api/analyze");
        assert_eq!(config.output.output_extension, "docx");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_object_deserializes_to_defaults() {
        let config: Config = serde_json::from_str("{}").expect("deserialize failed");

        assert_eq!(config.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.polling.poll_interval_ms, 2000);
        assert_eq!(config.polling.request_timeout, Duration::from_secs(30));
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn flattened_fields_are_read_at_top_level() {
        let config: Config = serde_json::from_str(
            r#"{
                "base_url": "https://analyzer.example.com",
                "poll_interval_ms": 500,
                "request_timeout": 5,
                "status_path": "/v2/status",
                "logging": { "level": "debug", "format": "json" }
            }"#,
        )
        .expect("deserialize failed");

        assert_eq!(config.poll_interval(), Duration::from_millis(500));
        assert_eq!(config.polling.request_timeout, Duration::from_secs(5));
        assert_eq!(config.endpoints.status_path, "/v2/status");
        assert_eq!(config.endpoints.analyze_path, "/api/analyze");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.logging.with_targets);
    }

    #[test]
    fn validate_rejects_unparseable_base_url() {
        let config = Config::with_base_url("not a url");

        match config.validate() {
            Err(Error::Config { key, .. }) => assert_eq!(key.as_deref(), Some("base_url")),
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn validate_rejects_zero_poll_interval() {
        let mut config = Config::default();
        config.polling.poll_interval_ms = 0;

        match config.validate() {
            Err(Error::Config { key, .. }) => {
                assert_eq!(key.as_deref(), Some("poll_interval_ms"))
            }
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn validate_rejects_zero_timeout_and_blank_extension() {
        let mut config = Config::default();
        config.polling.request_timeout = Duration::ZERO;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.output.output_extension = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn endpoint_urls_join_without_double_slashes() {
        let config = Config::with_base_url("http://localhost:5000/");

        assert_eq!(
            config.endpoint_url("/api/analyze"),
            "http://localhost:5000/api/analyze"
        );
        assert_eq!(
            config.endpoint_url_with_segment("/api/status/", "a b/c"),
            "http://localhost:5000/api/status/a%20b%2Fc"
        );
    }
}
