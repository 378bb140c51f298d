//! Room Session
//!
//! Client-side state machine for a shared-playlist room: which room is shown,
//! which tracks its members have in common, whether the shared playlist has
//! been created, and which preview is playing.
//!
//! # Features
//!
//! - **Reconciliation**: Periodic refresh that replaces room data wholesale
//! - **Room isolation**: Late responses for a previous room are never applied
//! - **Single-flight creation**: At most one playlist creation per room
//! - **Preview selection**: At most one preview at a time, never restarted twice
//! - **Reactive**: Snapshots published through `tokio::sync::watch`
//!
//! # Architecture
//!
//! ```text
//! RoomBackend ──fetch/join/create──▶ RoomSession ──SessionState──▶ watchers
//!      ▲                              │   │   │
//!      └──── RoomSyncLoop (ticker) ───┘   │   └─▶ PreviewPlayer
//!                                         └─▶ ConfirmationGate
//! ```
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use room_api::{ClientConfig, HttpRoomClient};
//! use room_session::{AutoConfirm, RoomSession, SessionConfig};
//!
//! room_session::logging::init_logging_from_env()?;
//!
//! let client = HttpRoomClient::new(ClientConfig::from_env())?;
//! let session = RoomSession::builder(client)
//!     .confirmation_gate(AutoConfirm::yes())
//!     .config(SessionConfig::fast_polling())
//!     .build();
//!
//! session.join("a1b2c3").await?;
//! let sync = session.start_sync();
//!
//! let mut states = session.subscribe();
//! while states.changed().await.is_ok() {
//!     let state = states.borrow().clone();
//!     println!("{} shared tracks", state.tracks.len());
//! }
//! # sync.stop();
//! ```

// Core modules
pub mod guard;
pub mod model;
pub mod ordering;
pub mod playback;
pub mod session;
pub mod sync;
pub mod view;

// Configuration
pub mod config;

// Error types
pub mod error;

// Logging infrastructure
pub mod logging;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::SessionConfig;
pub use error::{ErrorKind, ErrorOrigin, LastError, Result, SessionError};
pub use guard::{Admission, AutoConfirm, ConfirmationGate, CreationState, PlaylistCreationGuard};
pub use model::{Membership, SessionState, SharedTrackSet};
pub use playback::{NoopPlayer, PlaybackSelector, PreviewPlayer, SelectionChange};
pub use session::{RoomSession, RoomSessionBuilder};
pub use sync::{RefreshOutcome, RoomSyncLoop, SyncHandle};
pub use view::{ErrorSummary, SessionView, ViewSummary};

pub use room_api;

/// Commonly used types
pub mod prelude {
    pub use crate::{
        AutoConfirm, ConfirmationGate, CreationState, Membership, PreviewPlayer, RoomSession,
        SelectionChange, SessionConfig, SessionError, SessionState, SessionView,
    };
    pub use room_api::{HttpRoomClient, RoomBackend, RoomId, Track};
}
