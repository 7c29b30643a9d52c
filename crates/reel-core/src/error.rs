//! Error types for Reel Core

use thiserror::Error;

/// Result type alias for component operations
pub type Result<T> = std::result::Result<T, Error>;

/// Component error types
#[derive(Error, Debug)]
pub enum Error {
    // Engine errors
    #[error("Failed to create streaming engine: {0}")]
    EngineCreate(String),

    #[error("Failed to attach media target: {0}")]
    AttachMedia(String),

    #[error("Failed to load source {url}: {reason}")]
    LoadSource { url: String, reason: String },

    // Lifecycle errors
    #[error("Component is already mounted")]
    AlreadyMounted,

    #[error("No live engine instance")]
    NotAttached,

    // Quality errors
    #[error("Quality level {index} out of range ({available} levels available)")]
    InvalidLevel { index: usize, available: usize },

    // Configuration errors
    #[error("Invalid source locator: {0}")]
    InvalidSource(#[from] url::ParseError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an engine construction error
    pub fn engine(msg: impl Into<String>) -> Self {
        Error::EngineCreate(msg.into())
    }

    /// Returns true if the component keeps working after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::LoadSource { .. }
                | Error::NotAttached
                | Error::InvalidLevel { .. }
                | Error::InvalidSource(_)
        )
    }

    /// Returns the error code for diagnostics
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::EngineCreate(_) => "ENGINE_CREATE",
            Error::AttachMedia(_) => "ATTACH_MEDIA",
            Error::LoadSource { .. } => "LOAD_SOURCE",
            Error::AlreadyMounted => "ALREADY_MOUNTED",
            Error::NotAttached => "NOT_ATTACHED",
            Error::InvalidLevel { .. } => "INVALID_LEVEL",
            Error::InvalidSource(_) => "INVALID_SOURCE",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::Json(_) => "JSON",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::NotAttached.error_code(), "NOT_ATTACHED");
        assert_eq!(
            Error::InvalidLevel { index: 4, available: 2 }.error_code(),
            "INVALID_LEVEL"
        );
    }

    #[test]
    fn test_recoverable() {
        assert!(Error::NotAttached.is_recoverable());
        assert!(Error::InvalidLevel { index: 1, available: 0 }.is_recoverable());
        assert!(!Error::AlreadyMounted.is_recoverable());
        assert!(!Error::engine("boom").is_recoverable());
    }

    #[test]
    fn test_invalid_level_message() {
        let err = Error::InvalidLevel { index: 3, available: 2 };
        assert_eq!(
            err.to_string(),
            "Quality level 3 out of range (2 levels available)"
        );
    }
}
