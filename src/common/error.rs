//! Error types for the validation engine
//!
//! Errors are grouped by the scope they abort: input errors stop the whole
//! invocation before any browser starts, everything else is contained to a
//! single step, validation, or browser run by the orchestrator.

use std::io;
use thiserror::Error;

use crate::registry::Category;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the validation engine
#[derive(Error, Debug)]
pub enum Error {
    // === Input Errors ===
    #[error("Invalid validation file: {0}")]
    Parse(String),

    #[error("No target browsers requested. Add at least one entry to 'targetBrowsers' or pass --browser")]
    NoBrowsers,

    // === Vocabulary Errors ===
    #[error("Unknown {category} '{name}'. No built-in entry or registered plugin resolves it")]
    UnknownName { category: Category, name: String },

    #[error("No handler available for {category} '{name}'")]
    NoHandler { category: Category, name: String },

    #[error("Validation type '{validation}' does not support state '{state}'")]
    UnsupportedState { validation: String, state: String },

    // === Context Errors ===
    #[error("Unresolved expression '{expression}': {reason}")]
    UnresolvedExpression { expression: String, reason: String },

    #[error("Invalid output name '{0}': the name is already used by a value or the namespace is invalid")]
    InvalidOutputName(String),

    // === Step Errors ===
    #[error("Invalid {action} step: {reason}")]
    InvalidStep { action: String, reason: String },

    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    // === Session Errors ===
    #[error("No browser session bound. Steps can only run inside a browser pass")]
    NoDriver,

    #[error("A browser session is already bound to this context")]
    DriverBusy,

    #[error("Failed to start {browser} session: {reason}")]
    SessionStart { browser: String, reason: String },

    #[error("Browser session error: {0}")]
    Session(String),

    #[error("No element found for {0}")]
    ElementNotFound(String),

    #[error("Handler panicked: {0}")]
    HandlerPanicked(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Transport Errors ===
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Create an unknown name error for a vocabulary category
    pub fn unknown_name(category: Category, name: &str) -> Self {
        Self::UnknownName {
            category,
            name: name.to_string(),
        }
    }

    /// Create an unresolved expression error
    pub fn unresolved(expression: &str, reason: impl Into<String>) -> Self {
        Self::UnresolvedExpression {
            expression: expression.to_string(),
            reason: reason.into(),
        }
    }

    /// Create an unsupported state error
    pub fn unsupported_state(validation: &str, state: &str) -> Self {
        Self::UnsupportedState {
            validation: validation.to_string(),
            state: state.to_string(),
        }
    }

    /// Create an invalid step error
    pub fn invalid_step(action: &str, reason: impl Into<String>) -> Self {
        Self::InvalidStep {
            action: action.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a session start error
    pub fn session_start(browser: &str, reason: impl Into<String>) -> Self {
        Self::SessionStart {
            browser: browser.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a file read error
    pub fn file_read(path: &std::path::Path, error: impl std::fmt::Display) -> Self {
        Self::FileRead {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }

    /// Short machine-readable code, used in logs and report messages
    pub fn code(&self) -> &'static str {
        match self {
            Error::Parse(_) => "PARSE",
            Error::NoBrowsers => "NO_BROWSERS",
            Error::UnknownName { .. } => "UNKNOWN_NAME",
            Error::NoHandler { .. } => "NO_HANDLER",
            Error::UnsupportedState { .. } => "UNSUPPORTED_STATE",
            Error::UnresolvedExpression { .. } => "UNRESOLVED_EXPRESSION",
            Error::InvalidOutputName(_) => "INVALID_OUTPUT_NAME",
            Error::InvalidStep { .. } => "INVALID_STEP",
            Error::InvalidPattern { .. } => "INVALID_PATTERN",
            Error::NoDriver => "NO_DRIVER",
            Error::DriverBusy => "DRIVER_BUSY",
            Error::SessionStart { .. } => "SESSION_START",
            Error::Session(_) | Error::Http(_) => "SESSION",
            Error::ElementNotFound(_) => "ELEMENT_NOT_FOUND",
            Error::HandlerPanicked(_) => "HANDLER_PANICKED",
            Error::Config(_) | Error::ConfigParse(_) => "CONFIG",
            Error::Io(_) | Error::FileRead { .. } => "IO",
            Error::Json(_) => "JSON",
        }
    }
}
