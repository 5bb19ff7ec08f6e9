// src/error.rs

//! Unified error handling for the digest application.

use std::fmt;

use thiserror::Error;

/// Result type alias for digest operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// A source adapter failed to produce postings
    #[error("Source error for {source_name}: {message}")]
    Source {
        source_name: String,
        message: String,
    },

    /// A delivery channel rejected or failed a payload
    #[error("Dispatch error on {channel}: {message}")]
    Dispatch { channel: String, message: String },

    /// A bounded operation ran out of time
    #[error("Timed out after {secs}s: {context}")]
    Timeout { context: String, secs: u64 },
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a source error naming the adapter.
    pub fn source(source_name: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Source {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }

    /// Create a dispatch error naming the channel.
    pub fn dispatch(channel: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Dispatch {
            channel: channel.into(),
            message: message.to_string(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(context: impl Into<String>, secs: u64) -> Self {
        Self::Timeout {
            context: context.into(),
            secs,
        }
    }
}
