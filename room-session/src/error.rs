//! Error types for room sessions

use room_api::{ApiError, RoomId};
use serde::Serialize;
use thiserror::Error;

/// Result type for room session operations
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors that can occur while driving a room session
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The backend refused or failed a request
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The operation needs a room and none is known yet
    #[error("No room selected")]
    NoRoom,

    /// The operation needs a joined room
    #[error("Not a member of room {0}")]
    NotJoined(RoomId),

    /// The room changed while a join for this room was in flight
    #[error("Join of room {0} was superseded by a room change")]
    Superseded(RoomId),
}

/// The categories presentation code reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    TransientNetwork,
    NotFound,
    Unauthorized,
    RoomLocked,
    AlreadyExists,
    /// A track picked after reconciliation removed it. Selection absorbs this as
    /// `SelectionChange::IgnoredStale`, so no `SessionError` carries it.
    StaleSelection,
    /// Unexpected answers from the backend, or rejections outside the categories above
    Protocol,
    /// The caller used the session out of order, or a room change overtook the call
    Usage,
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::Api(api) => match api {
                ApiError::Transient(_) => ErrorKind::TransientNetwork,
                ApiError::NotFound(_) => ErrorKind::NotFound,
                ApiError::Unauthorized(_) => ErrorKind::Unauthorized,
                ApiError::RoomLocked(_) => ErrorKind::RoomLocked,
                ApiError::AlreadyExists(_) => ErrorKind::AlreadyExists,
                ApiError::Rejected { .. } | ApiError::Protocol(_) | ApiError::Configuration(_) => {
                    ErrorKind::Protocol
                }
            },
            SessionError::NoRoom | SessionError::NotJoined(_) | SessionError::Superseded(_) => {
                ErrorKind::Usage
            }
        }
    }

    /// Join failures that end the session until the user acts again
    pub fn is_terminal_for_join(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::NotFound | ErrorKind::Unauthorized | ErrorKind::RoomLocked
        )
    }

    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::TransientNetwork
    }
}

/// Which part of the session produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorOrigin {
    Join,
    Sync,
    Creation,
}

/// The most recent error, as kept in session state for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastError {
    pub origin: ErrorOrigin,
    pub error: SessionError,
}

impl LastError {
    pub fn new(origin: ErrorOrigin, error: SessionError) -> Self {
        Self { origin, error }
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}
