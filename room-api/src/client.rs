//! reqwest-based implementation of [`RoomBackend`]

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::backend::RoomBackend;
use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::model::{PlaylistCreationResult, Room, RoomId, RoomSnapshot};
use crate::wire::{CreatedPlaylistBody, PlaylistsBody, RoomBody};

/// HTTP client for the room backend
///
/// Credentials travel as cookies: either a session cookie from [`ClientConfig`]
/// or whatever the backend sets on the first response.
#[derive(Debug, Clone)]
pub struct HttpRoomClient {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpRoomClient {
    /// Create a client from configuration
    pub fn new(config: ClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Configuration(format!(
                "Base URL cannot hold paths: {}",
                config.base_url
            )));
        }

        let mut headers = HeaderMap::new();
        if let Some(cookie) = &config.session_cookie {
            let value = HeaderValue::from_str(cookie)
                .map_err(|e| ApiError::Configuration(format!("Invalid session cookie: {}", e)))?;
            headers.insert(COOKIE, value);
        }

        let http = reqwest::Client::builder()
            .cookie_store(true)
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/rooms/{room_id}/{suffix...}` with every segment percent-encoded
    fn room_url(&self, room_id: &RoomId, suffix: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Configuration("Base URL cannot hold paths".to_string()))?
            .pop_if_empty()
            .push("rooms")
            .push(room_id.as_str())
            .extend(suffix);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response> {
        let response = request.send().await?;
        let status = response.status();
        trace!("Room backend answered {}", status);

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(classify_status(status.as_u16(), &body))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self.send(self.http.get(url)).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl RoomBackend for HttpRoomClient {
    async fn fetch_room(&self, room_id: &RoomId) -> Result<RoomSnapshot> {
        let room_url = self.room_url(room_id, &[])?;
        let playlists_url = self.room_url(room_id, &["playlists"])?;
        debug!("Fetching room {}", room_id);

        let (room, playlists) = tokio::try_join!(
            self.get_json::<RoomBody>(room_url),
            self.get_json::<PlaylistsBody>(playlists_url),
        )?;

        let room = Room::from(room);
        if &room.id != room_id {
            return Err(ApiError::Protocol(format!(
                "Asked for room {} but received room {}",
                room_id, room.id
            )));
        }

        Ok(RoomSnapshot {
            room,
            tracks: playlists.into_tracks(),
        })
    }

    async fn join_room(&self, room_id: &RoomId) -> Result<()> {
        let url = self.room_url(room_id, &["users"])?;
        debug!("Joining room {}", room_id);
        self.send(self.http.post(url)).await?;
        Ok(())
    }

    async fn create_playlist(&self, room_id: &RoomId) -> Result<PlaylistCreationResult> {
        let url = self.room_url(room_id, &["playlists", "add"])?;
        debug!("Creating playlist for room {}", room_id);
        let response = self.send(self.http.post(url)).await?;
        let body = response.json::<CreatedPlaylistBody>().await?;
        Ok(body.into())
    }
}

/// Map a non-success HTTP answer onto [`ApiError`]
///
/// The backend reports several distinct conditions with `400` and a plain-text
/// message, so the body is inspected when the status alone is ambiguous.
pub fn classify_status(status: u16, body: &str) -> ApiError {
    let message = match body.trim() {
        "" => StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("no message")
            .to_string(),
        text => text.to_string(),
    };
    let lower = message.to_lowercase();

    match status {
        401 | 403 => ApiError::Unauthorized(message),
        404 => ApiError::NotFound(message),
        409 => ApiError::AlreadyExists(message),
        408 | 429 | 500..=599 => ApiError::Transient(message),
        _ if lower.contains("already exists") => ApiError::AlreadyExists(message),
        400 if lower.contains("does not exist") => ApiError::NotFound(message),
        400 if lower.contains("locked") => ApiError::RoomLocked(message),
        // music intersection still being computed or needing a restart
        400 if lower.contains("processing") => ApiError::Transient(message),
        _ => ApiError::Rejected { status, message },
    }
}
