//! Application configuration. API credentials, paths, toggles.
//!
//! Loaded once at startup; components receive immutable values derived from it.

use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.dify.ai/v1";

/// Default timeout for each remote call (upload, transcription, full workflow stream).
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 120;

/// Workflow input that receives the query text.
pub const DEFAULT_WORKFLOW_INPUT_KEY: &str = "Project_desc";

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Workflow API key. Read from FLOWBRIDGE_API_KEY or WORKFLOW_API_KEY.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Workflow API base URL. Read from FLOWBRIDGE_BASE_URL or WORKFLOW_BASE_URL.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Directory for temporary attachment files.
    #[serde(default)]
    pub tmp_dir: Option<String>,

    /// Directory for the inbound message log.
    #[serde(default)]
    pub log_dir: Option<String>,

    /// Append every inbound message to the message log. Read from LOG_INBOUND_MESSAGES too.
    #[serde(default)]
    pub log_messages: Option<bool>,

    #[serde(default)]
    pub http_timeout_secs: Option<u64>,

    /// Name of the workflow input that receives the query.
    #[serde(default)]
    pub workflow_input_key: Option<String>,
}

impl AppConfig {
    /// Expects `.env` to be loaded by the caller already.
    pub fn load() -> Result<Self, config::ConfigError> {
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("FLOWBRIDGE"));
        if let Ok(path) = std::env::var("FLOWBRIDGE_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        let mut cfg: Self = c.build()?.try_deserialize()?;
        // Unprefixed names, so an existing .env for the workflow app keeps working
        if let Ok(key) = std::env::var("WORKFLOW_API_KEY") {
            cfg.api_key = Some(key);
        }
        if let Ok(url) = std::env::var("WORKFLOW_BASE_URL") {
            cfg.base_url = Some(url);
        }
        if let Ok(s) = std::env::var("LOG_INBOUND_MESSAGES") {
            cfg.log_messages = Some(s.eq_ignore_ascii_case("true"));
        }
        Ok(cfg)
    }

    /// Returns the API key if configured and non-empty.
    pub fn api_key(&self) -> Option<String> {
        self.api_key.clone().filter(|k| !k.trim().is_empty())
    }

    /// Returns true if the remote workflow API can be used.
    pub fn is_api_configured(&self) -> bool {
        self.api_key().is_some()
    }

    /// Returns the base URL without a trailing slash.
    pub fn base_url_or_default(&self) -> String {
        self.base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string()
    }

    pub fn tmp_dir_or_default(&self) -> PathBuf {
        PathBuf::from(self.tmp_dir.as_deref().unwrap_or("./tmp"))
    }

    pub fn log_dir_or_default(&self) -> PathBuf {
        PathBuf::from(self.log_dir.as_deref().unwrap_or("./logs"))
    }

    pub fn log_messages_or_default(&self) -> bool {
        self.log_messages.unwrap_or(false)
    }

    /// Returns the per-call timeout. Defaults to 120 seconds.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS))
    }

    pub fn workflow_input_key_or_default(&self) -> String {
        self.workflow_input_key
            .clone()
            .unwrap_or_else(|| DEFAULT_WORKFLOW_INPUT_KEY.to_string())
    }

    /// Immutable settings for the HTTP adapters. None when no API key is configured.
    pub fn api_settings(&self) -> Option<ApiSettings> {
        Some(ApiSettings {
            base_url: self.base_url_or_default(),
            api_key: self.api_key()?,
            timeout: self.http_timeout(),
            input_key: self.workflow_input_key_or_default(),
        })
    }
}

/// Read-only connection settings shared by every remote call.
#[derive(Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
    pub input_key: String,
}

impl fmt::Debug for ApiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .field("input_key", &self.input_key)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = AppConfig::default();
        assert!(!cfg.is_api_configured());
        assert!(cfg.api_settings().is_none());
        assert_eq!(cfg.base_url_or_default(), DEFAULT_BASE_URL);
        assert_eq!(cfg.tmp_dir_or_default(), PathBuf::from("./tmp"));
        assert!(!cfg.log_messages_or_default());
        assert_eq!(cfg.http_timeout(), Duration::from_secs(120));
        assert_eq!(cfg.workflow_input_key_or_default(), "Project_desc");
    }

    #[test]
    fn settings_trim_base_url_and_redact_key() {
        let cfg = AppConfig {
            api_key: Some("app-secret".into()),
            base_url: Some("http://localhost:8080/v1/".into()),
            http_timeout_secs: Some(5),
            ..Default::default()
        };
        let settings = cfg.api_settings().unwrap();
        assert_eq!(settings.base_url, "http://localhost:8080/v1");
        assert_eq!(settings.timeout, Duration::from_secs(5));
        assert!(!format!("{settings:?}").contains("app-secret"));
    }

    #[test]
    fn blank_key_counts_as_unset() {
        let cfg = AppConfig {
            api_key: Some("  ".into()),
            ..Default::default()
        };
        assert!(!cfg.is_api_configured());
    }
}
