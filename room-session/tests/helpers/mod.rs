//! Mock collaborators for room session integration tests
//!
//! `MockBackend` answers from in-memory data and can hold requests until the
//! test releases them, which is how the tests force a particular interleaving
//! of responses. Every mock is `Clone` and shares its state, so a test keeps a
//! handle after giving a copy to the session.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use room_session::room_api::{
    self, ApiError, Member, MediaRef, PlaylistCreationResult, Room, RoomBackend, RoomId,
    RoomSnapshot, Track,
};
use room_session::{ConfirmationGate, PreviewPlayer, RoomSession, SessionConfig};
use tokio::sync::Semaphore;

// ============================================================================
// Data builders
// ============================================================================

pub fn room(id: &str) -> Room {
    Room {
        id: RoomId::new(id),
        name: format!("Room {}", id),
        locked: false,
        members: vec![Member::new("u1", "Alice"), Member::new("u2", "Bob")],
        is_owner: true,
    }
}

pub fn track(id: &str, artist: &str) -> Track {
    Track::new(id, format!("Song {}", id))
        .with_artists([artist])
        .with_media(format!("https://previews/{}.mp3", id))
}

pub fn silent_track(id: &str, artist: &str) -> Track {
    Track::new(id, format!("Song {}", id)).with_artists([artist])
}

pub fn snapshot(id: &str, tracks: Vec<Track>) -> RoomSnapshot {
    RoomSnapshot {
        room: room(id),
        tracks,
    }
}

pub fn created(name: &str) -> PlaylistCreationResult {
    PlaylistCreationResult::new(name).with_url(format!("https://open.spotify.com/playlist/{}", name))
}

// ============================================================================
// MockBackend
// ============================================================================

#[derive(Default)]
struct BackendData {
    rooms: HashMap<RoomId, room_api::Result<RoomSnapshot>>,
    join_failures: HashMap<RoomId, ApiError>,
    create_outcomes: VecDeque<room_api::Result<PlaylistCreationResult>>,
    fetch_holds: HashMap<RoomId, Arc<Semaphore>>,
    join_holds: HashMap<RoomId, Arc<Semaphore>>,
    create_hold: Option<Arc<Semaphore>>,
    fetch_calls: HashMap<RoomId, u32>,
    join_calls: HashMap<RoomId, u32>,
}

/// In-memory backend with controllable latency
#[derive(Clone, Default)]
pub struct MockBackend {
    data: Arc<Mutex<BackendData>>,
    create_calls: Arc<AtomicU32>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that serves one room with the given tracks
    pub fn with_room(id: &str, tracks: Vec<Track>) -> Self {
        let backend = Self::new();
        backend.set_room(id, tracks);
        backend
    }

    pub fn set_room(&self, id: &str, tracks: Vec<Track>) {
        self.data
            .lock()
            .unwrap()
            .rooms
            .insert(RoomId::new(id), Ok(snapshot(id, tracks)));
    }

    pub fn set_snapshot(&self, id: &str, snapshot: RoomSnapshot) {
        self.data
            .lock()
            .unwrap()
            .rooms
            .insert(RoomId::new(id), Ok(snapshot));
    }

    /// Make fetches of `id` fail until the room is set again
    pub fn fail_fetch(&self, id: &str, error: ApiError) {
        self.data
            .lock()
            .unwrap()
            .rooms
            .insert(RoomId::new(id), Err(error));
    }

    pub fn fail_join(&self, id: &str, error: ApiError) {
        self.data
            .lock()
            .unwrap()
            .join_failures
            .insert(RoomId::new(id), error);
    }

    pub fn allow_join(&self, id: &str) {
        self.data.lock().unwrap().join_failures.remove(&RoomId::new(id));
    }

    /// Queue the outcome of the next creation; without one creations succeed
    pub fn push_create_outcome(&self, outcome: room_api::Result<PlaylistCreationResult>) {
        self.data.lock().unwrap().create_outcomes.push_back(outcome);
    }

    /// Hold every fetch of `id` until `release_fetch` is called
    pub fn hold_fetches(&self, id: &str) {
        self.data
            .lock()
            .unwrap()
            .fetch_holds
            .insert(RoomId::new(id), Arc::new(Semaphore::new(0)));
    }

    /// Let one held fetch of `id` through
    pub fn release_fetch(&self, id: &str) {
        if let Some(hold) = self.data.lock().unwrap().fetch_holds.get(&RoomId::new(id)) {
            hold.add_permits(1);
        }
    }

    /// Hold every join of `id` until `release_join` is called
    pub fn hold_joins(&self, id: &str) {
        self.data
            .lock()
            .unwrap()
            .join_holds
            .insert(RoomId::new(id), Arc::new(Semaphore::new(0)));
    }

    pub fn release_join(&self, id: &str) {
        if let Some(hold) = self.data.lock().unwrap().join_holds.get(&RoomId::new(id)) {
            hold.add_permits(1);
        }
    }

    /// Hold every creation until `release_create` is called
    pub fn hold_creates(&self) {
        self.data.lock().unwrap().create_hold = Some(Arc::new(Semaphore::new(0)));
    }

    /// Let one held creation through
    pub fn release_create(&self) {
        if let Some(hold) = &self.data.lock().unwrap().create_hold {
            hold.add_permits(1);
        }
    }

    pub fn fetch_calls(&self, id: &str) -> u32 {
        self.data
            .lock()
            .unwrap()
            .fetch_calls
            .get(&RoomId::new(id))
            .copied()
            .unwrap_or(0)
    }

    pub fn join_calls(&self, id: &str) -> u32 {
        self.data
            .lock()
            .unwrap()
            .join_calls
            .get(&RoomId::new(id))
            .copied()
            .unwrap_or(0)
    }

    pub fn create_calls(&self) -> u32 {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// Yield until `id` has been fetched `count` times
    pub async fn wait_for_fetches(&self, id: &str, count: u32) {
        while self.fetch_calls(id) < count {
            tokio::task::yield_now().await;
        }
    }

    pub async fn wait_for_joins(&self, id: &str, count: u32) {
        while self.join_calls(id) < count {
            tokio::task::yield_now().await;
        }
    }

    pub async fn wait_for_creates(&self, count: u32) {
        while self.create_calls() < count {
            tokio::task::yield_now().await;
        }
    }
}

async fn pass(hold: Option<Arc<Semaphore>>) {
    if let Some(hold) = hold {
        hold.acquire()
            .await
            .expect("hold semaphore is never closed")
            .forget();
    }
}

#[async_trait]
impl RoomBackend for MockBackend {
    async fn fetch_room(&self, room_id: &RoomId) -> room_api::Result<RoomSnapshot> {
        let hold = {
            let mut data = self.data.lock().unwrap();
            *data.fetch_calls.entry(room_id.clone()).or_default() += 1;
            data.fetch_holds.get(room_id).cloned()
        };
        pass(hold).await;

        self.data
            .lock()
            .unwrap()
            .rooms
            .get(room_id)
            .cloned()
            .unwrap_or_else(|| Err(ApiError::NotFound(format!("room {}", room_id))))
    }

    async fn join_room(&self, room_id: &RoomId) -> room_api::Result<()> {
        let hold = {
            let mut data = self.data.lock().unwrap();
            *data.join_calls.entry(room_id.clone()).or_default() += 1;
            data.join_holds.get(room_id).cloned()
        };
        pass(hold).await;

        let data = self.data.lock().unwrap();
        if let Some(error) = data.join_failures.get(room_id) {
            return Err(error.clone());
        }
        if !data.rooms.contains_key(room_id) {
            return Err(ApiError::NotFound("Room does not exists".to_string()));
        }
        Ok(())
    }

    async fn create_playlist(&self, _room_id: &RoomId) -> room_api::Result<PlaylistCreationResult> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let hold = self.data.lock().unwrap().create_hold.clone();
        pass(hold).await;

        self.data
            .lock()
            .unwrap()
            .create_outcomes
            .pop_front()
            .unwrap_or_else(|| Ok(created("shared")))
    }
}

// ============================================================================
// RecordingPlayer
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerCall {
    Play(MediaRef),
    Stop,
}

/// Player that records every call it receives
#[derive(Debug, Default)]
pub struct RecordingPlayer {
    calls: Mutex<Vec<PlayerCall>>,
}

impl RecordingPlayer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<PlayerCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn plays(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, PlayerCall::Play(_)))
            .count()
    }
}

impl PreviewPlayer for RecordingPlayer {
    fn play(&self, media: &MediaRef) {
        self.calls.lock().unwrap().push(PlayerCall::Play(media.clone()));
    }

    fn stop(&self) {
        self.calls.lock().unwrap().push(PlayerCall::Stop);
    }
}

// ============================================================================
// ScriptedGate
// ============================================================================

/// Confirmation gate with a configurable answer that can be held open
#[derive(Clone)]
pub struct ScriptedGate {
    answer: Arc<AtomicBool>,
    asked: Arc<AtomicU32>,
    prompts: Arc<Mutex<Vec<String>>>,
    hold: Option<Arc<Semaphore>>,
}

impl ScriptedGate {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer: Arc::new(AtomicBool::new(answer)),
            asked: Arc::new(AtomicU32::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
            hold: None,
        }
    }

    /// Gate that waits for `release` before answering
    pub fn held(answer: bool) -> Self {
        Self {
            hold: Some(Arc::new(Semaphore::new(0))),
            ..Self::answering(answer)
        }
    }

    pub fn set_answer(&self, answer: bool) {
        self.answer.store(answer, Ordering::SeqCst);
    }

    /// Let one held confirmation answer
    pub fn release(&self) {
        if let Some(hold) = &self.hold {
            hold.add_permits(1);
        }
    }

    pub fn asked(&self) -> u32 {
        self.asked.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub async fn wait_until_asked(&self, count: u32) {
        while self.asked() < count {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl ConfirmationGate for ScriptedGate {
    async fn confirm(&self, prompt: &str) -> bool {
        self.asked.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        pass(self.hold.clone()).await;
        self.answer.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Session setup
// ============================================================================

pub struct Harness {
    pub session: RoomSession,
    pub backend: MockBackend,
    pub gate: ScriptedGate,
    pub player: Arc<RecordingPlayer>,
}

impl Harness {
    pub fn new(backend: MockBackend, gate: ScriptedGate) -> Self {
        Self::with_config(backend, gate, SessionConfig::default())
    }

    pub fn with_config(backend: MockBackend, gate: ScriptedGate, config: SessionConfig) -> Self {
        let player = RecordingPlayer::new();
        let session = RoomSession::builder(backend.clone())
            .confirmation_gate(gate.clone())
            .preview_player(player.clone())
            .config(config)
            .build();

        Self {
            session,
            backend,
            gate,
            player,
        }
    }

    /// Session over one room with the given tracks, confirming every prompt
    pub fn joinable(id: &str, tracks: Vec<Track>) -> Self {
        Self::new(MockBackend::with_room(id, tracks), ScriptedGate::answering(true))
    }
}
