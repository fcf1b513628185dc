//! Error types for the menucal pipeline.

use thiserror::Error;

/// Main error type for menucal operations.
#[derive(Error, Debug)]
pub enum MenucalError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Payload error: {0}")]
    Payload(#[from] PayloadError),

    #[error("Calendar emission error: {0}")]
    Emit(#[from] EmitError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-related errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Payload-level errors: the whole payload is unusable.
///
/// Per-entry problems (an unparseable date, an empty day) are not errors at
/// this level; they are skipped and tallied in the run report.
#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("Unrecognized payload shape: {0}")]
    UnrecognizedShape(String),

    #[error("Payload missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Payload declares invalid month index {0}")]
    InvalidMonth(i64),

    #[error("Payload declares invalid year {0}")]
    InvalidYear(i64),
}

/// Calendar emission errors. Always fatal to the run.
#[derive(Error, Debug)]
pub enum EmitError {
    #[error("Failed to create output directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write calendar to {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse calendar document: {0}")]
    Parse(String),
}

/// Result type alias for menucal operations.
pub type Result<T> = std::result::Result<T, MenucalError>;
