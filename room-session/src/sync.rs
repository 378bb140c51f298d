//! Periodic reconciliation of a session with the backend
//!
//! Each refresh fetches room details and shared tracks for the joined room and
//! replaces both wholesale. Responses are applied in the order they complete;
//! one that arrives after the session moved to another room is discarded.
//! A failed refresh keeps the last good data and records the error.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::error::{ErrorOrigin, Result, SessionError};
use crate::session::SessionInner;

/// Shortest interval accepted by [`RoomSyncLoop::spawn`]
const MIN_INTERVAL: Duration = Duration::from_millis(10);

/// What a single refresh did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// New room data was applied
    Applied,
    /// Nothing to do: no room, or not joined
    Inert,
    /// The session moved to another room while the fetch was in flight
    Discarded,
}

/// Reconciles one session with the backend
#[derive(Clone)]
pub struct RoomSyncLoop {
    inner: Arc<SessionInner>,
}

impl RoomSyncLoop {
    pub(crate) fn new(inner: Arc<SessionInner>) -> Self {
        Self { inner }
    }

    /// Fetch the joined room once and merge the result
    pub async fn refresh(&self) -> Result<RefreshOutcome> {
        let (epoch, room_id) = {
            let core = self.inner.core.lock();
            match (&core.room_id, core.membership.is_joined()) {
                (Some(room_id), true) => (core.epoch, room_id.clone()),
                _ => return Ok(RefreshOutcome::Inert),
            }
        };

        let outcome = self.inner.backend.fetch_room(&room_id).await;

        let mut core = self.inner.core.lock();
        if !core.is_current(epoch) {
            debug!("Discarding snapshot for room {}", room_id);
            return Ok(RefreshOutcome::Discarded);
        }

        match outcome {
            Ok(snapshot) if snapshot.room.id != room_id => {
                let error = SessionError::from(room_api::ApiError::Protocol(format!(
                    "asked for room {} but received room {}",
                    room_id, snapshot.room.id
                )));
                warn!("Failed to refresh room {}: {}", room_id, error);
                core.record_error(ErrorOrigin::Sync, error.clone());
                self.inner.publish(&core);
                Err(error)
            }
            Ok(snapshot) => {
                debug!(
                    "Refreshed room {}: {} shared tracks",
                    room_id,
                    snapshot.tracks.len()
                );
                core.apply_snapshot(snapshot);
                self.inner.publish(&core);
                Ok(RefreshOutcome::Applied)
            }
            Err(e) => {
                let error = SessionError::from(e);
                warn!("Failed to refresh room {}: {}", room_id, error);
                core.record_error(ErrorOrigin::Sync, error.clone());
                self.inner.publish(&core);
                Err(error)
            }
        }
    }

    /// Refresh every `interval` on a background task
    ///
    /// The first refresh happens one interval from now. Refreshes are inert
    /// while the session has no joined room, so the task can be started
    /// before joining and survives room switches.
    pub fn spawn(&self, interval: Duration) -> SyncHandle {
        let interval = interval.max(MIN_INTERVAL);
        let shutdown_signal = Arc::new(AtomicBool::new(false));
        let poll_count = Arc::new(AtomicU64::new(0));
        let error_count = Arc::new(AtomicU64::new(0));

        let task_loop = self.clone();
        let task_shutdown_signal = Arc::clone(&shutdown_signal);
        let task_poll_count = Arc::clone(&poll_count);
        let task_error_count = Arc::clone(&error_count);

        let task_handle = tokio::spawn(async move {
            task_loop
                .polling_loop(
                    interval,
                    task_shutdown_signal,
                    task_poll_count,
                    task_error_count,
                )
                .await;
        });

        SyncHandle {
            interval,
            task_handle: Some(task_handle),
            shutdown_signal,
            poll_count,
            error_count,
        }
    }

    async fn polling_loop(
        self,
        interval: Duration,
        shutdown_signal: Arc<AtomicBool>,
        poll_count: Arc<AtomicU64>,
        error_count: Arc<AtomicU64>,
    ) {
        info!("Starting room sync (interval: {:?})", interval);

        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if shutdown_signal.load(Ordering::Relaxed) {
                break;
            }

            poll_count.fetch_add(1, Ordering::Relaxed);
            match self.refresh().await {
                Ok(outcome) => {
                    error_count.store(0, Ordering::Relaxed);
                    debug!("Room sync tick: {:?}", outcome);
                }
                Err(e) => {
                    let errors = error_count.fetch_add(1, Ordering::Relaxed) + 1;
                    debug!("Room sync tick failed (consecutive errors: {}): {}", errors, e);
                }
            }
        }

        info!("Room sync stopped");
    }
}

impl std::fmt::Debug for RoomSyncLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomSyncLoop").finish_non_exhaustive()
    }
}

/// Running background reconciliation
///
/// Polling stops when the handle is stopped or dropped.
#[derive(Debug)]
pub struct SyncHandle {
    interval: Duration,
    task_handle: Option<JoinHandle<()>>,
    shutdown_signal: Arc<AtomicBool>,
    poll_count: Arc<AtomicU64>,
    error_count: Arc<AtomicU64>,
}

impl SyncHandle {
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Refreshes attempted so far
    pub fn poll_count(&self) -> u64 {
        self.poll_count.load(Ordering::Relaxed)
    }

    /// Refreshes that failed since the last success
    pub fn consecutive_errors(&self) -> u64 {
        self.error_count.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        self.task_handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stop polling; an in-flight refresh is abandoned
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.shutdown_signal.store(true, Ordering::Relaxed);
        if let Some(handle) = self.task_handle.take() {
            handle.abort();
        }
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
