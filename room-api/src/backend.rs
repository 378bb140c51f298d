//! The seam between room sessions and whatever serves room data

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;
use crate::model::{PlaylistCreationResult, RoomId, RoomSnapshot};

/// Request contracts consumed by a room session
///
/// Implementations must be safe to call concurrently. Each call is independent;
/// ordering, deduplication and staleness are the caller's concern.
#[async_trait]
pub trait RoomBackend: Send + Sync {
    /// Fetch the room and the tracks common to all of its members
    async fn fetch_room(&self, room_id: &RoomId) -> Result<RoomSnapshot>;

    /// Add the current user to the room; succeeds if the user is already a member
    async fn join_room(&self, room_id: &RoomId) -> Result<()>;

    /// Create a playlist from the room's shared tracks on the user's account
    async fn create_playlist(&self, room_id: &RoomId) -> Result<PlaylistCreationResult>;
}

#[async_trait]
impl<T: RoomBackend + ?Sized> RoomBackend for Arc<T> {
    async fn fetch_room(&self, room_id: &RoomId) -> Result<RoomSnapshot> {
        (**self).fetch_room(room_id).await
    }

    async fn join_room(&self, room_id: &RoomId) -> Result<()> {
        (**self).join_room(room_id).await
    }

    async fn create_playlist(&self, room_id: &RoomId) -> Result<PlaylistCreationResult> {
        (**self).create_playlist(room_id).await
    }
}
