use thiserror::Error;

/// Core error type for taskmatrix operations.
#[derive(Error, Debug)]
pub enum MatrixError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Remote sync error: {0}")]
    Remote(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No team is registered on this device")]
    NotRegistered,

    #[error("An employee cannot delete their own record")]
    SelfDeletionForbidden,

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error(transparent)]
    Join(#[from] JoinError),
}

/// Failures parsing an invite reference during team join.
///
/// Surfaced as inline validation messages; the user retries with a
/// corrected reference.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinError {
    #[error("Invite reference is not a valid URL")]
    InvalidInviteFormat,

    #[error("Invite reference is missing the teamId parameter")]
    MissingTeamId,
}

impl From<serde_json::Error> for MatrixError {
    fn from(e: serde_json::Error) -> Self {
        MatrixError::Serialization(e.to_string())
    }
}

/// Result type alias using MatrixError.
pub type Result<T> = std::result::Result<T, MatrixError>;
