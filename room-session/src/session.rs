//! The room session: one room at a time, one state snapshot
//!
//! # Architecture
//!
//! ```text
//! RoomSession (cheap to clone)
//! └── Arc<SessionInner>
//!     ├── backend: Arc<dyn RoomBackend>
//!     ├── gate: Arc<dyn ConfirmationGate>
//!     ├── player: Arc<dyn PreviewPlayer>
//!     ├── core: Mutex<SessionCore>     (epoch, membership, guard, selector, ...)
//!     └── state_tx: watch::Sender<SessionState>
//! ```
//!
//! Every room change bumps the epoch. Requests remember the epoch they were
//! issued under and their responses are dropped when it no longer matches, so a
//! slow answer for room A can never land in room B. The lock is never held
//! across an `.await`.

use std::sync::Arc;

use parking_lot::Mutex;
use room_api::{ApiError, RoomBackend, RoomId, RoomSnapshot, Track};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::error::{ErrorOrigin, LastError, Result, SessionError};
use crate::guard::{Admission, AutoConfirm, ConfirmationGate, CreationState, PlaylistCreationGuard};
use crate::model::{Membership, SessionState, SharedTrackSet};
use crate::playback::{NoopPlayer, PlaybackSelector, PreviewPlayer, SelectionChange};
use crate::sync::{RefreshOutcome, RoomSyncLoop, SyncHandle};
use crate::view::SessionView;

// ============================================================================
// SessionCore
// ============================================================================

/// Mutable session state, only touched under the session lock
#[derive(Debug, Default)]
pub(crate) struct SessionCore {
    pub(crate) epoch: u64,
    pub(crate) room_id: Option<RoomId>,
    pub(crate) membership: Membership,
    pub(crate) room: Option<room_api::Room>,
    pub(crate) tracks: SharedTrackSet,
    pub(crate) guard: PlaylistCreationGuard,
    pub(crate) selector: PlaybackSelector,
    pub(crate) last_error: Option<LastError>,
}

impl SessionCore {
    pub(crate) fn is_current(&self, epoch: u64) -> bool {
        self.epoch == epoch
    }

    /// Tear down everything tied to the previous room
    ///
    /// Returns the selection change the player has to be told about.
    pub(crate) fn switch_room(&mut self, room_id: Option<RoomId>) -> SelectionChange {
        self.epoch += 1;
        self.membership = if room_id.is_some() {
            Membership::Joining
        } else {
            Membership::NoRoom
        };
        self.room_id = room_id;
        self.room = None;
        self.tracks = SharedTrackSet::new();
        self.guard.reset();
        self.last_error = None;
        self.selector.clear()
    }

    /// Replace room details and shared tracks with a fresh report
    ///
    /// Creation and selection state are left alone.
    pub(crate) fn apply_snapshot(&mut self, snapshot: RoomSnapshot) {
        self.room = Some(snapshot.room);
        self.tracks = SharedTrackSet::from_server(snapshot.tracks);
        self.clear_error_from(ErrorOrigin::Sync);
    }

    pub(crate) fn record_error(&mut self, origin: ErrorOrigin, error: SessionError) {
        self.last_error = Some(LastError::new(origin, error));
    }

    pub(crate) fn clear_error_from(&mut self, origin: ErrorOrigin) {
        if self.last_error.as_ref().is_some_and(|e| e.origin == origin) {
            self.last_error = None;
        }
    }

    pub(crate) fn snapshot(&self) -> SessionState {
        SessionState {
            room_id: self.room_id.clone(),
            membership: self.membership,
            room: self.room.clone(),
            tracks: self.tracks.clone(),
            creation: self.guard.state().clone(),
            playlist: self.guard.result().cloned(),
            confirming: self.guard.is_confirming(),
            now_playing: self.selector.current().cloned(),
            last_error: self.last_error.clone(),
        }
    }
}

// ============================================================================
// SessionInner
// ============================================================================

pub(crate) struct SessionInner {
    pub(crate) backend: Arc<dyn RoomBackend>,
    pub(crate) gate: Arc<dyn ConfirmationGate>,
    pub(crate) player: Arc<dyn PreviewPlayer>,
    pub(crate) config: SessionConfig,
    pub(crate) core: Mutex<SessionCore>,
    pub(crate) state_tx: watch::Sender<SessionState>,
}

impl SessionInner {
    /// Publish the current snapshot to every subscriber
    pub(crate) fn publish(&self, core: &SessionCore) {
        self.state_tx.send_replace(core.snapshot());
    }
}

// ============================================================================
// RoomSession
// ============================================================================

/// Client-side session for one shared-playlist room
///
/// Clones share the same session. All operations are safe to call
/// concurrently; each one either applies against the room it started with or
/// not at all.
///
/// # Example
///
/// ```rust,ignore
/// use room_api::{ClientConfig, HttpRoomClient};
/// use room_session::{AutoConfirm, RoomSession};
///
/// let client = HttpRoomClient::new(ClientConfig::from_env())?;
/// let session = RoomSession::builder(client)
///     .confirmation_gate(AutoConfirm::yes())
///     .build();
///
/// session.join("a1b2c3").await?;
/// let _sync = session.start_sync();
///
/// for track in session.view().tracks() {
///     println!("{} - {}", track.joined_artists(), track.title);
/// }
/// ```
#[derive(Clone)]
pub struct RoomSession {
    inner: Arc<SessionInner>,
}

impl RoomSession {
    /// Session with default configuration, a declining gate and no player
    pub fn new(backend: impl RoomBackend + 'static) -> Self {
        Self::builder(backend).build()
    }

    pub fn builder(backend: impl RoomBackend + 'static) -> RoomSessionBuilder {
        RoomSessionBuilder::new(Arc::new(backend))
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Current snapshot
    pub fn state(&self) -> SessionState {
        self.inner.state_tx.borrow().clone()
    }

    /// Derived view over the current snapshot
    pub fn view(&self) -> SessionView {
        SessionView::new(self.state(), self.inner.config.placeholder_link.clone())
    }

    /// Receive every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state_tx.subscribe()
    }

    pub fn room_id(&self) -> Option<RoomId> {
        self.inner.core.lock().room_id.clone()
    }

    /// Enter a room
    ///
    /// A different room tears down everything tied to the current one before
    /// the join request goes out. Joining the room already joined (or being
    /// joined) does nothing; joining it again after a refusal retries. An empty
    /// room id behaves like [`leave`](Self::leave).
    ///
    /// After a successful join the room is reconciled once. A failure of that
    /// first reconciliation is recorded in the state, not returned.
    ///
    /// Returns [`SessionError::Superseded`] when another room change lands
    /// before the backend answers; the answer is dropped and the session keeps
    /// the newer room.
    pub async fn join(&self, room_id: impl Into<RoomId>) -> Result<()> {
        let room_id = room_id.into();
        if room_id.is_unknown() {
            self.leave();
            return Ok(());
        }

        let epoch = {
            let mut core = self.inner.core.lock();
            let same_room = core.room_id.as_ref() == Some(&room_id);

            if same_room && core.membership.is_active() {
                debug!("Already in room {}, ignoring join", room_id);
                return Ok(());
            }

            if same_room {
                info!("Retrying join for room {}", room_id);
                core.membership = Membership::Joining;
                core.clear_error_from(ErrorOrigin::Join);
            } else {
                info!("Switching to room {}", room_id);
                core.switch_room(Some(room_id.clone()))
                    .apply(self.inner.player.as_ref());
            }

            self.inner.publish(&core);
            core.epoch
        };

        let outcome = self.inner.backend.join_room(&room_id).await;

        {
            let mut core = self.inner.core.lock();
            if !core.is_current(epoch) {
                debug!("Discarding join response for room {}", room_id);
                return Err(SessionError::Superseded(room_id));
            }

            match outcome {
                Ok(()) => {
                    info!("Joined room {}", room_id);
                    core.membership = Membership::Joined;
                    core.clear_error_from(ErrorOrigin::Join);
                    self.inner.publish(&core);
                }
                Err(e) => {
                    let error = SessionError::from(e);
                    warn!("Failed to join room {}: {}", room_id, error);
                    core.membership = Membership::Rejected(error.kind());
                    core.record_error(ErrorOrigin::Join, error.clone());
                    self.inner.publish(&core);
                    return Err(error);
                }
            }
        }

        if let Err(e) = self.sync_loop().refresh().await {
            debug!("Initial reconciliation of room {} failed: {}", room_id, e);
        }
        Ok(())
    }

    /// Drop the current room and everything tied to it
    pub fn leave(&self) {
        let mut core = self.inner.core.lock();
        if core.room_id.is_none() {
            return;
        }

        if let Some(room_id) = &core.room_id {
            info!("Leaving room {}", room_id);
        }
        core.switch_room(None).apply(self.inner.player.as_ref());
        self.inner.publish(&core);
    }

    /// Reconcile with the backend now
    pub async fn refresh(&self) -> Result<RefreshOutcome> {
        self.sync_loop().refresh().await
    }

    pub fn sync_loop(&self) -> RoomSyncLoop {
        RoomSyncLoop::new(Arc::clone(&self.inner))
    }

    /// Reconcile in the background every `poll_interval`
    ///
    /// Must be called from within a Tokio runtime. Polling stops when the
    /// returned handle is stopped or dropped.
    pub fn start_sync(&self) -> SyncHandle {
        self.sync_loop().spawn(self.inner.config.poll_interval)
    }

    /// Create the shared playlist, at most once per room
    ///
    /// The user is asked through the confirmation gate first. Returns the
    /// creation state after the attempt; a refused or declined attempt
    /// returns without contacting the backend. A failed request is returned as
    /// an error and recorded in the state.
    ///
    /// Dropping the returned future while the user is being asked abandons
    /// the attempt. Dropping it after the request went out marks the attempt
    /// as failed so it can be retried.
    pub async fn create_playlist(&self) -> Result<CreationState> {
        let (epoch, room_id) = {
            let mut core = self.inner.core.lock();
            let room_id = core.room_id.clone().ok_or(SessionError::NoRoom)?;
            if !core.membership.is_joined() {
                return Err(SessionError::NotJoined(room_id));
            }

            if let Admission::Refused(state) = core.guard.request_create() {
                return Ok(state);
            }
            self.inner.publish(&core);
            (core.epoch, room_id)
        };

        let mut ticket = CreationTicket::confirming(Arc::clone(&self.inner), epoch);
        let confirmed = self
            .inner
            .gate
            .confirm(&self.inner.config.confirmation_prompt)
            .await;

        {
            let mut core = self.inner.core.lock();
            if !core.is_current(epoch) {
                ticket.disarm();
                debug!("Discarding confirmation for room {}", room_id);
                return Ok(core.guard.state().clone());
            }

            let proceed = core.guard.resolve_confirmation(confirmed);
            self.inner.publish(&core);
            if !proceed {
                ticket.disarm();
                info!("Playlist creation for room {} declined", room_id);
                return Ok(core.guard.state().clone());
            }
            ticket.stage = Some(TicketStage::Requesting);
        }

        info!("Creating playlist for room {}", room_id);
        let outcome = self.inner.backend.create_playlist(&room_id).await;
        ticket.disarm();

        let mut core = self.inner.core.lock();
        if !core.is_current(epoch) {
            info!("Discarding playlist creation outcome for room {}", room_id);
            return Ok(core.guard.state().clone());
        }

        match outcome {
            Ok(result) => {
                info!("Created playlist '{}' for room {}", result.name, room_id);
                core.guard.complete(Ok(result));
                core.clear_error_from(ErrorOrigin::Creation);
                self.inner.publish(&core);
                Ok(core.guard.state().clone())
            }
            Err(e) => {
                let error = SessionError::from(e);
                warn!("Failed to create playlist for room {}: {}", room_id, error);
                core.guard.complete(Err(error.clone()));
                core.record_error(ErrorOrigin::Creation, error.clone());
                self.inner.publish(&core);
                Err(error)
            }
        }
    }

    /// Move a shown creation failure back to `Idle`
    pub fn acknowledge_failure(&self) {
        let mut core = self.inner.core.lock();
        if core.guard.acknowledge_failure() {
            core.clear_error_from(ErrorOrigin::Creation);
            self.inner.publish(&core);
        }
    }

    /// Select a track for preview
    ///
    /// The player is told about the change before this returns. A track that
    /// is no longer shared is ignored and reported as a stale selection.
    pub fn select_track(&self, track: &Track) -> SelectionChange {
        let mut core = self.inner.core.lock();
        let SessionCore {
            selector, tracks, ..
        } = &mut *core;
        let change = selector.select(track, tracks);
        change.apply(self.inner.player.as_ref());

        if change.is_change() {
            self.inner.publish(&core);
        }
        change
    }

    pub fn clear_selection(&self) -> SelectionChange {
        let mut core = self.inner.core.lock();
        let change = core.selector.clear();
        change.apply(self.inner.player.as_ref());

        if change.is_change() {
            self.inner.publish(&core);
        }
        change
    }

    /// Forget the last error without changing anything else
    pub fn dismiss_error(&self) {
        let mut core = self.inner.core.lock();
        if core.last_error.take().is_some() {
            self.inner.publish(&core);
        }
    }
}

impl std::fmt::Debug for RoomSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomSession")
            .field("room_id", &self.room_id())
            .field("config", &self.inner.config)
            .finish()
    }
}

// ============================================================================
// CreationTicket
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TicketStage {
    Confirming,
    Requesting,
}

/// Puts the guard back in a consistent state if `create_playlist` is dropped
struct CreationTicket {
    inner: Arc<SessionInner>,
    epoch: u64,
    stage: Option<TicketStage>,
}

impl CreationTicket {
    fn confirming(inner: Arc<SessionInner>, epoch: u64) -> Self {
        Self {
            inner,
            epoch,
            stage: Some(TicketStage::Confirming),
        }
    }

    fn disarm(&mut self) {
        self.stage = None;
    }
}

impl Drop for CreationTicket {
    fn drop(&mut self) {
        let Some(stage) = self.stage.take() else {
            return;
        };

        let mut core = self.inner.core.lock();
        if !core.is_current(self.epoch) {
            return;
        }

        match stage {
            TicketStage::Confirming => {
                debug!("Playlist creation abandoned during confirmation");
                core.guard.cancel_confirmation();
            }
            TicketStage::Requesting => {
                warn!("Playlist creation abandoned while the request was outstanding");
                let error = SessionError::from(ApiError::Transient("request cancelled".to_string()));
                core.guard.complete(Err(error.clone()));
                core.record_error(ErrorOrigin::Creation, error);
            }
        }
        self.inner.publish(&core);
    }
}

// ============================================================================
// RoomSessionBuilder
// ============================================================================

/// Builder for [`RoomSession`]
pub struct RoomSessionBuilder {
    backend: Arc<dyn RoomBackend>,
    gate: Arc<dyn ConfirmationGate>,
    player: Arc<dyn PreviewPlayer>,
    config: SessionConfig,
}

impl RoomSessionBuilder {
    fn new(backend: Arc<dyn RoomBackend>) -> Self {
        Self {
            backend,
            gate: Arc::new(AutoConfirm::no()),
            player: Arc::new(NoopPlayer),
            config: SessionConfig::default(),
        }
    }

    /// Set the gate asked before a playlist is created
    ///
    /// Without one every creation is declined.
    pub fn confirmation_gate(mut self, gate: impl ConfirmationGate + 'static) -> Self {
        self.gate = Arc::new(gate);
        self
    }

    /// Set the player that receives selection changes
    pub fn preview_player(mut self, player: Arc<dyn PreviewPlayer>) -> Self {
        self.player = player;
        self
    }

    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> RoomSession {
        let (state_tx, _) = watch::channel(SessionState::default());

        debug!(
            "RoomSession created (poll interval {:?})",
            self.config.poll_interval
        );

        RoomSession {
            inner: Arc::new(SessionInner {
                backend: self.backend,
                gate: self.gate,
                player: self.player,
                config: self.config,
                core: Mutex::new(SessionCore::default()),
                state_tx,
            }),
        }
    }
}
