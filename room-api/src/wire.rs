//! JSON bodies exchanged with the backend
//!
//! The backend speaks in the shapes of its own storage layer (`user_infos`,
//! `tracks_in_common`, `spotify_url`). These DTOs absorb those names and
//! convert into the model types.

use serde::{Deserialize, Serialize};

use crate::model::{MediaRef, Member, PlaylistCreationResult, Room, RoomId, Track};

/// Body of `GET /rooms/{id}`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RoomBody {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub locked: Option<bool>,
    #[serde(default)]
    pub users: Option<Vec<UserBody>>,
    #[serde(default)]
    pub is_owner: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserBody {
    pub user_infos: UserInfosBody,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserInfosBody {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Body of `GET /rooms/{id}/playlists`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaylistsBody {
    #[serde(default)]
    pub tracks_in_common: Option<Vec<TrackBody>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackBody {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistBody>,
    #[serde(default)]
    pub preview_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtistBody {
    pub name: String,
}

/// Body of `POST /rooms/{id}/playlists/add`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreatedPlaylistBody {
    pub name: String,
    #[serde(default)]
    pub spotify_url: Option<String>,
}

impl From<RoomBody> for Room {
    fn from(body: RoomBody) -> Self {
        let id = RoomId::new(body.id);
        // The backend falls back to "Room #<id>" when a room was created without a name
        let name = if body.name.is_empty() {
            format!("Room #{}", id)
        } else {
            body.name
        };

        Room {
            id,
            name,
            locked: body.locked.unwrap_or(false),
            members: body
                .users
                .unwrap_or_default()
                .into_iter()
                .map(|u| Member::new(u.user_infos.id, u.user_infos.name))
                .collect(),
            is_owner: body.is_owner,
        }
    }
}

impl From<TrackBody> for Track {
    fn from(body: TrackBody) -> Self {
        Track {
            id: body.id.into(),
            title: body.name,
            artists: body.artists.into_iter().map(|a| a.name).collect(),
            media: body
                .preview_url
                .filter(|url| !url.is_empty())
                .map(MediaRef::new),
        }
    }
}

impl PlaylistsBody {
    pub fn into_tracks(self) -> Vec<Track> {
        self.tracks_in_common
            .unwrap_or_default()
            .into_iter()
            .map(Track::from)
            .collect()
    }
}

impl From<CreatedPlaylistBody> for PlaylistCreationResult {
    fn from(body: CreatedPlaylistBody) -> Self {
        PlaylistCreationResult {
            name: body.name,
            external_url: body.spotify_url.filter(|url| !url.is_empty()),
        }
    }
}
