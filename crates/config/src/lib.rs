//! Configuration loading, validation, and management for Synapse.
//!
//! Loads configuration from `~/.synapse/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.synapse/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default generation backend
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Max tokens per generation step (unset = backend default)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_max_tokens: Option<u32>,

    /// Orchestration loop settings
    #[serde(default)]
    pub runner: RunnerConfig,

    /// Built-in policy evaluator settings
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_provider() -> String {
    "gemini".into()
}
fn default_model() -> String {
    "gemini-2.0-flash".into()
}

fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("runner", &self.runner)
            .field("policy", &self.policy)
            .field("providers", &self.providers)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

/// Orchestration loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Generation steps per run
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,

    /// Pause between steps, in milliseconds (0 = no pause)
    #[serde(default = "default_step_backoff_ms")]
    pub step_backoff_ms: u64,

    /// Per-step generation timeout in seconds (0 = no timeout)
    #[serde(default = "default_generation_timeout_secs")]
    pub generation_timeout_secs: u64,

    /// Retries for transient backend failures (0 = first failure is fatal)
    #[serde(default)]
    pub max_retries: u32,

    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Replace the built-in system instruction entirely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction_override: Option<String>,
}

fn default_max_steps() -> usize {
    6
}
fn default_step_backoff_ms() -> u64 {
    200
}
fn default_generation_timeout_secs() -> u64 {
    60
}
fn default_retry_backoff_ms() -> u64 {
    500
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            step_backoff_ms: default_step_backoff_ms(),
            generation_timeout_secs: default_generation_timeout_secs(),
            max_retries: 0,
            retry_backoff_ms: default_retry_backoff_ms(),
            system_instruction_override: None,
        }
    }
}

/// Thresholds for the built-in heuristic policy evaluator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Confidence used when the evaluator offers none
    #[serde(default = "default_confidence")]
    pub default_confidence: f64,

    /// Escalate when confidence falls below this
    #[serde(default = "default_escalate_below")]
    pub escalate_below: f64,

    /// Tools whose side effects are hard to reverse
    #[serde(default = "default_high_risk_tools")]
    pub high_risk_tools: Vec<String>,

    /// Minimum confidence required before a high-risk tool goes unflagged
    #[serde(default = "default_high_risk_min_confidence")]
    pub high_risk_min_confidence: f64,

    /// Refunds above this amount are escalated for review
    #[serde(default = "default_refund_auto_approve_limit")]
    pub refund_auto_approve_limit: f64,
}

fn default_confidence() -> f64 {
    0.3
}
fn default_escalate_below() -> f64 {
    0.5
}
fn default_high_risk_tools() -> Vec<String> {
    vec!["issue_instant_refund".into(), "exonerate_driver".into()]
}
fn default_high_risk_min_confidence() -> f64 {
    0.9
}
fn default_refund_auto_approve_limit() -> f64 {
    50.0
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            default_confidence: default_confidence(),
            escalate_below: default_escalate_below(),
            high_risk_tools: default_high_risk_tools(),
            high_risk_min_confidence: default_high_risk_min_confidence(),
            refund_auto_approve_limit: default_refund_auto_approve_limit(),
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

impl AppConfig {
    /// Load configuration from the default path (~/.synapse/config.toml).
    ///
    /// Also checks environment variables for API keys:
    /// - `SYNAPSE_API_KEY` (highest priority)
    /// - `GEMINI_API_KEY`
    /// - `OPENAI_API_KEY`
    /// - `OPENROUTER_API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.api_key.is_none() {
            self.api_key = ["SYNAPSE_API_KEY", "GEMINI_API_KEY", "OPENAI_API_KEY", "OPENROUTER_API_KEY"]
                .iter()
                .find_map(|key| lookup(key).filter(|v| !v.is_empty()));
        }

        if let Some(provider) = lookup("SYNAPSE_PROVIDER").filter(|v| !v.is_empty()) {
            self.default_provider = provider;
        }

        if let Some(model) = lookup("SYNAPSE_MODEL").filter(|v| !v.is_empty()) {
            self.default_model = model;
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".synapse")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_model.trim().is_empty() {
            return Err(ConfigError::ValidationError("default_model must not be empty".into()));
        }

        if self.runner.max_steps == 0 {
            return Err(ConfigError::ValidationError(
                "runner.max_steps must be at least 1".into(),
            ));
        }

        let p = &self.policy;
        for (name, value) in [
            ("policy.default_confidence", p.default_confidence),
            ("policy.escalate_below", p.escalate_below),
            ("policy.high_risk_min_confidence", p.high_risk_min_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be between 0.0 and 1.0"
                )));
            }
        }

        if !p.refund_auto_approve_limit.is_finite() || p.refund_auto_approve_limit < 0.0 {
            return Err(ConfigError::ValidationError(
                "policy.refund_auto_approve_limit must be a non-negative number".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_max_tokens: None,
            runner: RunnerConfig::default(),
            policy: PolicyConfig::default(),
            providers: HashMap::new(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
