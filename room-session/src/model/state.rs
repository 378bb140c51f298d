//! Published session state

use room_api::{MediaRef, PlaylistCreationResult, Room, RoomId};

use super::SharedTrackSet;
use crate::error::{ErrorKind, ErrorOrigin, LastError};
use crate::guard::CreationState;

/// Where the user stands with the current room
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Membership {
    /// No room is selected
    #[default]
    NoRoom,
    /// A join request is outstanding
    Joining,
    /// The backend accepted the join; reconciliation runs
    Joined,
    /// The backend refused the join; nothing runs until the user acts again
    Rejected(ErrorKind),
}

impl Membership {
    pub fn is_joined(&self) -> bool {
        matches!(self, Membership::Joined)
    }

    /// True while a join is outstanding or has been accepted
    pub fn is_active(&self) -> bool {
        matches!(self, Membership::Joining | Membership::Joined)
    }
}

/// Snapshot of everything a room session exposes
///
/// Replaced as a whole on every change and handed out by value, so a reader
/// never observes a half-applied update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Room being shown, `None` until one is joined
    pub room_id: Option<RoomId>,
    pub membership: Membership,
    /// Latest room details, `None` until the first successful reconciliation
    pub room: Option<Room>,
    /// Shared tracks in display order
    pub tracks: SharedTrackSet,
    pub creation: CreationState,
    /// Created playlist; kept through later failed attempts
    pub playlist: Option<PlaylistCreationResult>,
    /// A confirmation prompt is waiting for an answer
    pub confirming: bool,
    pub now_playing: Option<MediaRef>,
    pub last_error: Option<LastError>,
}

impl SessionState {
    /// True once room details have arrived at least once
    pub fn is_loaded(&self) -> bool {
        self.room.is_some()
    }

    pub fn error_from(&self, origin: ErrorOrigin) -> Option<&LastError> {
        self.last_error.as_ref().filter(|e| e.origin == origin)
    }
}
