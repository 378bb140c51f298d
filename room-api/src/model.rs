//! Domain types for rooms, members and shared tracks
//!
//! These are read-only projections of what the backend reports. The client
//! never mutates a [`Track`] or a [`Room`]; it only replaces them wholesale.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Generates the common conversions for string identifier newtypes
macro_rules! impl_id_type {
    ($name:ident) => {
        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                $name::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                $name::new(s)
            }
        }
    };
}

/// Opaque identifier of a room, stable for the room's lifetime
///
/// Surrounding whitespace is trimmed. An empty id means the room is not known
/// yet (for example a route parameter that has not been resolved).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self(id.trim().to_string())
    }

    /// True when the id does not name a room yet
    pub fn is_unknown(&self) -> bool {
        self.0.is_empty()
    }
}

impl_id_type!(RoomId);

/// Streaming-service identifier of a track
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackId(String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl_id_type!(TrackId);

/// Identifier of a room member
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl_id_type!(UserId);

/// Playable preview reference of a track (an audio URL)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaRef(String);

impl MediaRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }
}

impl_id_type!(MediaRef);

/// A user taking part in a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: UserId,
    pub display_name: String,
}

impl Member {
    pub fn new(id: impl Into<UserId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// A room and its membership roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    /// Locked rooms do not accept new members
    pub locked: bool,
    pub members: Vec<Member>,
    /// Whether the requesting user created the room
    pub is_owner: bool,
}

impl Room {
    /// Display names of all members, comma separated
    pub fn member_names(&self) -> String {
        self.members
            .iter()
            .map(|m| m.display_name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn has_member(&self, id: &UserId) -> bool {
        self.members.iter().any(|m| &m.id == id)
    }
}

/// A track common to every member of a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub artists: Vec<String>,
    /// Preview audio, absent for tracks the service cannot preview
    pub media: Option<MediaRef>,
}

impl Track {
    pub fn new(id: impl Into<TrackId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artists: Vec::new(),
            media: None,
        }
    }

    pub fn with_artists<I, S>(mut self, artists: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.artists = artists.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_media(mut self, media: impl Into<MediaRef>) -> Self {
        self.media = Some(media.into());
        self
    }

    /// Artist names joined the way they are displayed and sorted
    pub fn joined_artists(&self) -> String {
        self.artists.join(", ")
    }
}

/// Everything one reconciliation needs: the room and its shared tracks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub room: Room,
    /// Tracks in the order the server reported them
    pub tracks: Vec<Track>,
}

/// Outcome of a successful playlist creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistCreationResult {
    pub name: String,
    /// Link to the playlist on the streaming service, when the service returned one
    pub external_url: Option<String>,
}

impl PlaylistCreationResult {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            external_url: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.external_url = Some(url.into());
        self
    }

    /// The external link, or `placeholder` when none was returned
    pub fn link_or<'a>(&'a self, placeholder: &'a str) -> &'a str {
        self.external_url.as_deref().unwrap_or(placeholder)
    }
}
