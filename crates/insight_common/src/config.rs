//! Agent configuration.
//!
//! Lives in `<config_dir>/insight-agent/config.toml`. Every field has a
//! default, so an empty or missing file yields a working offline-capable
//! agent. Credentials are never compiled in; they come from the file or
//! from the environment.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

const CONFIG_DIR_NAME: &str = "insight-agent";
const CONFIG_FILE: &str = "config.toml";

/// Language of the built-in pattern tables and response templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Language {
    #[default]
    #[serde(rename = "pt")]
    Portuguese,
    #[serde(rename = "en")]
    English,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Portuguese => "pt",
            Language::English => "en",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pt" | "pt-br" | "portuguese" | "português" => Some(Language::Portuguese),
            "en" | "english" => Some(Language::English),
            _ => None,
        }
    }
}

/// Decision core settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Below this confidence the agent asks a human instead of answering
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,

    /// Interaction log capacity
    #[serde(default = "default_max_memory_size")]
    pub max_memory_size: usize,

    /// How many records a ranking step retrieves
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Confidence reported when no pattern matched at all
    #[serde(default = "default_fallback_confidence")]
    pub default_confidence: f32,

    #[serde(default)]
    pub language: Language,
}

fn default_confidence_threshold() -> f32 {
    0.7
}

fn default_max_memory_size() -> usize {
    1000
}

fn default_top_n() -> usize {
    10
}

fn default_fallback_confidence() -> f32 {
    0.3
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            max_memory_size: default_max_memory_size(),
            top_n: default_top_n(),
            default_confidence: default_fallback_confidence(),
            language: Language::default(),
        }
    }
}

/// Text generation backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_enabled")]
    pub enabled: bool,

    /// Full chat-completions URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Generation request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connectivity probe timeout
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
}

fn default_llm_enabled() -> bool {
    true
}

fn default_endpoint() -> String {
    "https://api.x.ai/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "grok-4".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_probe_timeout_secs() -> u64 {
    10
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: default_llm_enabled(),
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
            probe_timeout_secs: default_probe_timeout_secs(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AgentConfig {
    #[serde(default)]
    pub agent: AgentSettings,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub log: LogConfig,
}

impl AgentConfig {
    /// Load from an explicit path, or the default location, or defaults.
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file is not.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Apply environment overrides. Unparseable numeric values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("XAI_API_KEY").filter(|k| !k.trim().is_empty()) {
            self.llm.api_key = Some(key);
        }
        if let Some(url) = lookup("XAI_API_URL").filter(|u| !u.trim().is_empty()) {
            self.llm.endpoint = url;
        }
        if let Some(model) = lookup("INSIGHT_MODEL").filter(|m| !m.trim().is_empty()) {
            self.llm.model = model;
        }
        if let Some(threshold) = lookup("CONFIDENCE_THRESHOLD").and_then(|v| v.parse().ok()) {
            self.agent.confidence_threshold = threshold;
        }
        if let Some(size) = lookup("MAX_MEMORY_SIZE").and_then(|v| v.parse().ok()) {
            self.agent.max_memory_size = size;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = self.agent.confidence_threshold;
        if !(0.0..=1.0).contains(&t) {
            return Err(ConfigError::InvalidThreshold(t));
        }
        let d = self.agent.default_confidence;
        if !(0.0..=1.0).contains(&d) {
            return Err(ConfigError::InvalidThreshold(d));
        }
        if self.agent.max_memory_size == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }
}

/// Default config file location, if the platform has a config directory
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE))
}
