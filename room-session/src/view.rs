//! Read-only view over a session snapshot for presentation code

use room_api::{MediaRef, PlaylistCreationResult, Room, RoomId, Track};
use serde::Serialize;

use crate::error::{ErrorKind, ErrorOrigin, LastError};
use crate::guard::CreationState;
use crate::model::{Membership, SessionState};

/// A snapshot plus the answers a screen needs from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    state: SessionState,
    placeholder_link: String,
}

impl SessionView {
    pub fn new(state: SessionState, placeholder_link: impl Into<String>) -> Self {
        Self {
            state,
            placeholder_link: placeholder_link.into(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn room_id(&self) -> Option<&RoomId> {
        self.state.room_id.as_ref()
    }

    pub fn room(&self) -> Option<&Room> {
        self.state.room.as_ref()
    }

    pub fn room_name(&self) -> Option<&str> {
        self.room().map(|r| r.name.as_str())
    }

    pub fn is_locked(&self) -> bool {
        self.room().is_some_and(|r| r.locked)
    }

    /// Member names joined by ", ", empty before the room has loaded
    pub fn member_names(&self) -> String {
        self.room().map(Room::member_names).unwrap_or_default()
    }

    pub fn membership(&self) -> Membership {
        self.state.membership
    }

    /// Shared tracks in display order
    pub fn tracks(&self) -> &[Track] {
        self.state.tracks.as_slice()
    }

    pub fn track_count(&self) -> usize {
        self.state.tracks.len()
    }

    pub fn has_tracks(&self) -> bool {
        !self.state.tracks.is_empty()
    }

    pub fn now_playing(&self) -> Option<&MediaRef> {
        self.state.now_playing.as_ref()
    }

    /// Whether `track` is the one being previewed
    pub fn is_playing(&self, track: &Track) -> bool {
        match (&track.media, &self.state.now_playing) {
            (Some(media), Some(playing)) => media == playing,
            _ => false,
        }
    }

    pub fn creation_state(&self) -> &CreationState {
        &self.state.creation
    }

    pub fn is_creating(&self) -> bool {
        self.state.creation.is_requesting()
    }

    /// Whether a create action would be admitted right now
    pub fn can_create(&self) -> bool {
        self.state.membership.is_joined()
            && !self.state.confirming
            && matches!(
                self.state.creation,
                CreationState::Idle | CreationState::Failed(_)
            )
    }

    pub fn created_playlist(&self) -> Option<&PlaylistCreationResult> {
        self.state.playlist.as_ref()
    }

    /// Link to the created playlist, or the placeholder if it has none
    pub fn playlist_link(&self) -> Option<&str> {
        self.created_playlist()
            .map(|p| p.link_or(&self.placeholder_link))
    }

    pub fn last_error(&self) -> Option<&LastError> {
        self.state.last_error.as_ref()
    }

    pub fn summary(&self) -> ViewSummary {
        ViewSummary {
            room_id: self.room_id().map(|id| id.to_string()),
            room_name: self.room_name().map(str::to_string),
            locked: self.is_locked(),
            members: self
                .room()
                .map(|r| r.members.iter().map(|m| m.display_name.clone()).collect())
                .unwrap_or_default(),
            track_count: self.track_count(),
            now_playing: self.now_playing().map(|m| m.to_string()),
            creation: self.state.creation.label(),
            playlist_link: self.playlist_link().map(str::to_string),
            error: self.last_error().map(|e| ErrorSummary {
                kind: e.kind(),
                origin: e.origin,
                message: e.error.to_string(),
            }),
        }
    }
}

/// Serializable digest of a view, for logs and debugging endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewSummary {
    pub room_id: Option<String>,
    pub room_name: Option<String>,
    pub locked: bool,
    pub members: Vec<String>,
    pub track_count: usize,
    pub now_playing: Option<String>,
    pub creation: &'static str,
    pub playlist_link: Option<String>,
    pub error: Option<ErrorSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorSummary {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}
