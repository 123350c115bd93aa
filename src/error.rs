use std::path::PathBuf;
use thiserror::Error;

use crate::client::ApiFailure;

/// Main error type for sonar-query
#[derive(Error, Debug)]
pub enum SonarError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration validation errors
    #[error("Configuration validation failed: {errors:?}")]
    ConfigValidation { errors: Vec<ValidationError> },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Invalid configuration value
    #[error("Invalid configuration value at {path}: {message}")]
    InvalidConfigValue { path: String, message: String },

    /// Malformed ISO week label
    #[error("Invalid ISO week label '{label}': expected YYYY-Www")]
    InvalidWeek { label: String },

    /// Malformed calendar date
    #[error("Invalid date '{value}': {message}")]
    InvalidDate { value: String, message: String },

    /// Query string could not be decoded
    #[error("Invalid query string parameter '{key}': {message}")]
    QueryDecode { key: String, message: String },

    /// Saved query session not found
    #[error("Session state not found: {path}")]
    SessionNotFound { path: PathBuf },

    /// Backend request failed
    #[error("API request failed: {0}")]
    Api(#[from] ApiFailure),

    /// IO errors
    #[error("IO error: {context}: {source}")]
    Io {
        source: std::io::Error,
        context: String,
    },

    /// TOML deserialization errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialization(#[from] toml::ser::Error),

    /// JSON errors
    #[error("JSON error: {context}: {source}")]
    Json {
        source: serde_json::Error,
        context: String,
    },

    /// Generic errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Path to the configuration key that failed validation
    pub path: String,
    /// Error message describing the validation failure
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type for sonar-query operations
pub type Result<T> = std::result::Result<T, SonarError>;
