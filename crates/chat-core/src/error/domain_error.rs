//! Domain errors - error types for the domain layer

use thiserror::Error;

/// Domain layer errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Content too long: max {max} characters")]
    ContentTooLong { max: usize },

    #[error("Invalid room name: {0}")]
    InvalidRoomName(String),

    #[error("Invalid user name: {0}")]
    InvalidUserName(String),

    // =========================================================================
    // Lifecycle Errors
    // =========================================================================
    #[error("Chat core has been shut down")]
    ShutDown,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Archive error: {0}")]
    ArchiveError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Shorthand for the empty-message rejection
    pub fn empty_message() -> Self {
        Self::ValidationError("message text must not be empty".to_string())
    }

    /// Get an error code string for reporting
    pub fn code(&self) -> &'static str {
        match self {
            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::ContentTooLong { .. } => "CONTENT_TOO_LONG",
            Self::InvalidRoomName(_) => "INVALID_ROOM_NAME",
            Self::InvalidUserName(_) => "INVALID_USER_NAME",

            // Lifecycle
            Self::ShutDown => "SHUT_DOWN",

            // Infrastructure
            Self::ArchiveError(_) => "ARCHIVE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::ContentTooLong { .. }
                | Self::InvalidRoomName(_)
                | Self::InvalidUserName(_)
        )
    }
}

/// Result type for core operations
pub type CoreResult<T> = Result<T, DomainError>;
