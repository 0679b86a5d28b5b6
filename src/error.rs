//! Error types for Duckie.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

/// Main error type for Duckie operations.
#[derive(Error, Debug)]
pub enum DuckieError {
    /// Request rejected before execution (unknown data source, not a SELECT, etc.)
    #[error("Validation error: {0}")]
    Validation(String),

    /// SQL text could not be parsed. Carries the parser message verbatim.
    #[error("Syntax error: {0}")]
    Syntax(String),

    /// Engine failures (cannot open, execution failed, describe failed, etc.)
    #[error("Engine error: {0}")]
    Engine(String),

    /// No engine connection became available in time.
    #[error("Engine error: {0}")]
    EngineBusy(String),

    /// The resolved column list and the engine's result shape disagree.
    #[error("Consistency error: {0}")]
    Consistency(String),

    /// Configuration errors (invalid config file, empty allow-list, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DuckieError {
    /// Creates a validation error with the given message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a syntax error with the given message.
    pub fn syntax(msg: impl Into<String>) -> Self {
        Self::Syntax(msg.into())
    }

    /// Creates an engine error with the given message.
    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine(msg.into())
    }

    /// Creates the error reported when every engine connection is taken.
    pub fn engine_busy() -> Self {
        Self::EngineBusy("no available connection, retry later".to_string())
    }

    /// Creates a consistency error with the given message.
    pub fn consistency(msg: impl Into<String>) -> Self {
        Self::Consistency(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Validation Error",
            Self::Syntax(_) => "Syntax Error",
            Self::Engine(_) | Self::EngineBusy(_) => "Engine Error",
            Self::Consistency(_) => "Consistency Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }

    /// Returns the message without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(msg)
            | Self::Syntax(msg)
            | Self::Engine(msg)
            | Self::EngineBusy(msg)
            | Self::Consistency(msg)
            | Self::Config(msg)
            | Self::Internal(msg) => msg,
        }
    }
}

/// Result type alias using DuckieError.
pub type Result<T> = std::result::Result<T, DuckieError>;
