//! Assistant configuration with documented defaults
//!
//! Values come from an optional TOML file and are then overridden by the
//! `LLM_*` environment variables. The resulting config is passed explicitly
//! to the planner, the tools and the front-end.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::error::{DeskError, Result};

/// Default chat completions endpoint (OpenAI-compatible)
pub const DEFAULT_API_URL: &str = "https://api.mistral.ai/v1/chat/completions";

/// Default model used for planning
pub const DEFAULT_MODEL: &str = "mistral-large-latest";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub llm: LlmConfig,
    pub workers: WorkerConfig,
}

/// Planner connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API key; `LLM_API_KEY` takes precedence when set
    pub api_key: Option<String>,

    /// Chat completion endpoint
    ///
    /// URLs containing `anthropic.com` use the Anthropic messages format,
    /// everything else is treated as OpenAI-compatible.
    pub api_url: String,

    /// Model identifier sent with every request
    pub model: String,

    /// Whole-request timeout for a planner call
    pub request_timeout_secs: u64,

    /// Upper bound on response tokens
    ///
    /// Plans are short JSON documents, 1024 leaves plenty of headroom.
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_API_URL.into(),
            model: DEFAULT_MODEL.into(),
            request_timeout_secs: 30,
            max_tokens: 1024,
        }
    }
}

/// Background work settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Slice length for cooperative sleeps (milliseconds)
    ///
    /// A sleeping worker notices cancellation within one slice, so this is
    /// also the worst-case latency of `stop` for timer-style tools.
    pub poll_interval_ms: u64,

    /// How often wall-clock tools (alarms, reminders) compare the time
    pub clock_poll_secs: u64,

    /// How long a signal-triggered shutdown waits for workers to exit
    pub shutdown_grace_secs: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 250,
            clock_poll_secs: 30,
            shutdown_grace_secs: 5,
        }
    }
}

impl WorkerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn clock_poll(&self) -> Duration {
        Duration::from_secs(self.clock_poll_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

impl AssistantConfig {
    /// Load configuration from an optional TOML file, then apply env overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    pub fn parse_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Override LLM settings from `LLM_API_KEY`, `LLM_API_URL` and `LLM_MODEL`
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("LLM_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Ok(url) = std::env::var("LLM_API_URL") {
            self.llm.api_url = url;
        }
        if let Ok(model) = std::env::var("LLM_MODEL") {
            self.llm.model = model;
        }
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.llm.api_url.trim().is_empty() {
            return Err(DeskError::Config("llm.api_url must not be empty".into()));
        }
        if self.llm.model.trim().is_empty() {
            return Err(DeskError::Config("llm.model must not be empty".into()));
        }
        if self.llm.request_timeout_secs == 0 {
            return Err(DeskError::Config(
                "llm.request_timeout_secs must be positive".into(),
            ));
        }
        if self.workers.poll_interval_ms == 0 || self.workers.clock_poll_secs == 0 {
            return Err(DeskError::Config("worker poll intervals must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AssistantConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.llm.api_url, DEFAULT_API_URL);
        assert_eq!(config.workers.poll_interval(), Duration::from_millis(250));
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = AssistantConfig::parse_toml(
            r#"
            [llm]
            model = "open-mixtral-8x22b"

            [workers]
            shutdown_grace_secs = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.llm.model, "open-mixtral-8x22b");
        assert_eq!(config.llm.api_url, DEFAULT_API_URL);
        assert_eq!(config.workers.shutdown_grace(), Duration::from_secs(10));
        assert_eq!(config.workers.poll_interval_ms, 250);
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let mut config = AssistantConfig::default();
        config.workers.poll_interval_ms = 0;
        assert!(matches!(config.validate(), Err(DeskError::Config(_))));
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        let result = AssistantConfig::parse_toml("[llm\nmodel = ");
        assert!(matches!(result, Err(DeskError::TomlError(_))));
    }
}
