//! Configuration types for chatdock.
//!
//! A single JSON file describes where questions are sent and how the widget
//! introduces itself. Every field is optional; a missing file means defaults.

use crate::backend::HttpOptions;
use crate::protocol::DEFAULT_SESSION_ID;
use crate::session::{SessionOptions, DEFAULT_GREETING};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Config file location relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = ".chatdock/config.json";

/// Main configuration for chatdock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Chat endpoint receiving `POST {question, session_id}`.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Session identifier sent with every question.
    #[serde(default = "default_session_id")]
    pub session_id: String,

    /// First assistant message of every session.
    #[serde(default = "default_greeting")]
    pub greeting: String,

    /// Panel title.
    #[serde(default = "default_title")]
    pub title: String,

    /// Hint shown in the empty entry field.
    #[serde(default = "default_placeholder")]
    pub placeholder: String,

    /// Append the underlying error to fallback messages.
    #[serde(default)]
    pub debug_errors: bool,

    /// Whole-request timeout in seconds. Absent means wait indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,

    /// Connection timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_timeout_secs: Option<u64>,
}

fn default_endpoint() -> String {
    "http://localhost:8000/chat".into()
}

fn default_session_id() -> String {
    DEFAULT_SESSION_ID.into()
}

fn default_greeting() -> String {
    DEFAULT_GREETING.into()
}

fn default_title() -> String {
    "Insurellm AI Chatbot".into()
}

fn default_placeholder() -> String {
    "Type your question...".into()
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Parse)
    }

    /// Load configuration, falling back to defaults when the file is absent.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            debug!(path = %path.display(), "Loading config");
            Self::load(path)
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        std::fs::write(path, content).map_err(ConfigError::Io)
    }

    /// Replace the endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Check that the configuration is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(&self.endpoint).map_err(|e| {
            ConfigError::Invalid(format!("endpoint '{}' is not a URL: {e}", self.endpoint))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "endpoint '{}' must use http or https",
                self.endpoint
            )));
        }
        if self.session_id.trim().is_empty() {
            return Err(ConfigError::Invalid("session_id must not be empty".into()));
        }
        if self.request_timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be greater than zero".into(),
            ));
        }
        if self.connect_timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "connect_timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Settings for a new [`crate::Session`].
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            session_id: self.session_id.clone(),
            greeting: self.greeting.clone(),
            debug_errors: self.debug_errors,
        }
    }

    /// Settings for [`crate::HttpBackend`].
    pub fn http_options(&self) -> HttpOptions {
        HttpOptions {
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
            connect_timeout: self.connect_timeout_secs.map(Duration::from_secs),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            session_id: default_session_id(),
            greeting: default_greeting(),
            title: default_title(),
            placeholder: default_placeholder(),
            debug_errors: false,
            request_timeout_secs: None,
            connect_timeout_secs: None,
        }
    }
}

/// Errors that can occur when working with configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading or writing config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing config JSON.
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// Error serializing config to JSON.
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Config parsed but holds an unusable value.
    #[error("Invalid config: {0}")]
    Invalid(String),
}
