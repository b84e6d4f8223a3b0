//! Error types for the insight agent.
//!
//! Only construction can fail. Once an `Agent` exists, every request
//! degrades to a textual answer instead of returning one of these.

use thiserror::Error;

/// Failures reported by a `DataService`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("data unavailable: {0}")]
    Unavailable(String),

    #[error("metric not supported: {0}")]
    InvalidMetric(String),
}

impl DataError {
    pub fn code(&self) -> &'static str {
        match self {
            DataError::Unavailable(_) => "data_unavailable",
            DataError::InvalidMetric(_) => "invalid_metric",
        }
    }
}

/// Configuration and construction errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid pattern '{pattern}' for {intent}: {source}")]
    InvalidPattern {
        intent: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("confidence threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f32),

    #[error("memory capacity must be at least 1")]
    ZeroCapacity,

    #[error("cannot read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("HTTP client setup failed: {0}")]
    HttpClient(String),
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::InvalidPattern { .. } => "invalid_pattern",
            ConfigError::InvalidThreshold(_) => "invalid_threshold",
            ConfigError::ZeroCapacity => "zero_capacity",
            ConfigError::Read { .. } => "config_read",
            ConfigError::Parse { .. } => "config_parse",
            ConfigError::HttpClient(_) => "http_client",
        }
    }
}

/// Umbrella error for agent construction.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AgentError {
    pub fn code(&self) -> &'static str {
        match self {
            AgentError::Config(e) => e.code(),
            AgentError::Json(_) => "json",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(DataError::Unavailable("x".into()).code(), "data_unavailable");
        assert_eq!(ConfigError::InvalidThreshold(1.5).code(), "invalid_threshold");
        let err: AgentError = ConfigError::ZeroCapacity.into();
        assert_eq!(err.code(), "zero_capacity");
    }

    #[test]
    fn test_data_error_display() {
        let err = DataError::InvalidMetric("felicidade".into());
        assert_eq!(err.to_string(), "metric not supported: felicidade");
    }
}
