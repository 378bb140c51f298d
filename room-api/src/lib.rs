//! Room API for the shared playlist backend
//!
//! This crate describes what a room looks like from the client side and how to
//! talk to the backend that owns it. It is deliberately free of any session
//! logic: the `room-session` crate consumes the [`RoomBackend`] trait and never
//! sees HTTP.
//!
//! # Contracts
//!
//! ```text
//! GET  /rooms/{id}                 ┐
//! GET  /rooms/{id}/playlists       ┘→ RoomBackend::fetch_room      → RoomSnapshot
//! POST /rooms/{id}/users            → RoomBackend::join_room       → ()
//! POST /rooms/{id}/playlists/add    → RoomBackend::create_playlist → PlaylistCreationResult
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use room_api::{ClientConfig, HttpRoomClient, RoomBackend, RoomId};
//!
//! let client = HttpRoomClient::new(ClientConfig::from_env())?;
//! let room_id = RoomId::new("a1b2c3");
//! client.join_room(&room_id).await?;
//!
//! let snapshot = client.fetch_room(&room_id).await?;
//! println!("{} tracks in common", snapshot.tracks.len());
//! ```

pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod wire;

pub use backend::RoomBackend;
pub use client::{classify_status, HttpRoomClient};
pub use config::ClientConfig;
pub use error::{ApiError, Result};
pub use model::{
    MediaRef, Member, PlaylistCreationResult, Room, RoomId, RoomSnapshot, Track, TrackId, UserId,
};
