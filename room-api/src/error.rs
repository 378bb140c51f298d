use thiserror::Error;

/// Failures reported by the room backend
///
/// The variants follow what the backend can tell us about a request rather than
/// how the request travelled. Transport failures collapse into [`ApiError::Transient`]
/// because the only sensible reaction to them is to try again later.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Network failure, timeout, server error, or data that is not ready yet
    #[error("Transient network error: {0}")]
    Transient(String),

    /// The room does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The user is not logged in or is not a member of the room
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The room is locked and not accepting new members
    #[error("Room locked: {0}")]
    RoomLocked(String),

    /// The playlist has already been created
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Any other refusal from the backend
    #[error("Request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The backend answered with a body we could not decode
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The client was configured with unusable settings
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ApiError {
    /// Whether retrying the same request later may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::Transient(_))
    }
}

/// Type alias for results that can return an ApiError
pub type Result<T> = std::result::Result<T, ApiError>;

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            ApiError::Protocol(error.to_string())
        } else if error.is_builder() {
            ApiError::Configuration(error.to_string())
        } else {
            // connect, timeout, request and body errors
            ApiError::Transient(error.to_string())
        }
    }
}

impl From<url::ParseError> for ApiError {
    fn from(error: url::ParseError) -> Self {
        ApiError::Configuration(format!("Invalid URL: {}", error))
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> Self {
        ApiError::Protocol(error.to_string())
    }
}
