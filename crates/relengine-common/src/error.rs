//! Error types shared by the Relation Engine crates

use thiserror::Error;

/// Result type alias for common operations
pub type Result<T> = std::result::Result<T, CommonError>;

/// Error type for the shared utilities
#[derive(Error, Debug)]
pub enum CommonError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid log setting: {0}")]
    InvalidLogSetting(String),

    #[error("Logging initialisation failed: {0}")]
    LoggingInit(String),
}

impl CommonError {
    /// Create an invalid log setting error
    pub fn invalid_log_setting(msg: impl Into<String>) -> Self {
        Self::InvalidLogSetting(msg.into())
    }

    /// Create a logging initialisation error
    pub fn logging_init(msg: impl Into<String>) -> Self {
        Self::LoggingInit(msg.into())
    }
}
