//! Structured error types for configuration resolution.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Resolution errors
    NotFound,
    UnknownKey,
    UnknownSource,
    IsSection,

    // Source errors
    Coerce,
    NoSubsection,
    Parse,
    Io,
}

/// Structured error for configuration operations.
#[derive(Debug, Error, Serialize)]
#[error("{message}")]
pub struct ConfigError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl ConfigError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            key: None,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    // Convenience constructors

    pub fn not_found(key: &str) -> Self {
        Self::new(
            ErrorCode::NotFound,
            format!("Configuration key {} doesn't exist", key),
        )
        .with_key(key)
    }

    pub fn unknown_key(key: &str) -> Self {
        Self::new(
            ErrorCode::UnknownKey,
            format!("No source accepts configuration key {}", key),
        )
        .with_key(key)
    }

    pub fn unknown_source(key: &str, source_id: &str) -> Self {
        Self::new(
            ErrorCode::UnknownSource,
            format!("No source with identifier {} to set {} on", source_id, key),
        )
        .with_key(key)
    }

    pub fn is_section(key: &str) -> Self {
        Self::new(
            ErrorCode::IsSection,
            format!("{} is a subsection, not a value", key),
        )
        .with_key(key)
    }

    pub fn coerce(key: &str, value: impl fmt::Display, kind: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::Coerce,
            format!("Cannot convert {} = {:?} to {}", key, value.to_string(), kind),
        )
        .with_key(key)
    }

    pub fn no_subsection(source_id: &str, name: &str) -> Self {
        Self::new(
            ErrorCode::NoSubsection,
            format!("Source {} has no subsection {}", source_id, name),
        )
        .with_key(name)
    }

    pub fn parse(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::Parse, err.to_string())
    }

    pub fn io(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::Io, err.to_string())
    }

    /// True for read failures that `get_or` turns into the default.
    pub fn is_not_found(&self) -> bool {
        self.code == ErrorCode::NotFound
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::parse(err)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::parse(err)
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
