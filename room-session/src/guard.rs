//! Single-flight guard around playlist creation
//!
//! ```text
//!            request_create()          resolve_confirmation(true)
//!   Idle ───────────────────▶ (confirming) ─────────────────────▶ Requesting
//!    ▲  ◀─────────────────────────┘ declined                        │
//!    │                                                 complete(..) │
//!    │   acknowledge_failure() / request_create()      ┌────────────┴───────┐
//!    └──────────────────────────────────────────── Failed            Succeeded
//! ```
//!
//! `Succeeded` is terminal until the guard is reset by a room change. While a
//! confirmation is pending or a request is outstanding, every further
//! `request_create()` is refused and reports the current state.

use async_trait::async_trait;
use room_api::PlaylistCreationResult;
use tracing::debug;

use crate::error::SessionError;

/// Asks the user whether to go ahead with an action
#[async_trait]
pub trait ConfirmationGate: Send + Sync {
    /// Resolve to `true` when the user agreed
    async fn confirm(&self, prompt: &str) -> bool;
}

/// Gate with a fixed answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoConfirm(pub bool);

impl AutoConfirm {
    pub fn yes() -> Self {
        AutoConfirm(true)
    }

    pub fn no() -> Self {
        AutoConfirm(false)
    }
}

#[async_trait]
impl ConfirmationGate for AutoConfirm {
    async fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}

/// Where playlist creation stands for the current room
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CreationState {
    #[default]
    Idle,
    Requesting,
    Succeeded,
    /// The last attempt failed; a new attempt is allowed
    Failed(SessionError),
}

impl CreationState {
    pub fn is_idle(&self) -> bool {
        matches!(self, CreationState::Idle)
    }

    pub fn is_requesting(&self) -> bool {
        matches!(self, CreationState::Requesting)
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(self, CreationState::Succeeded)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, CreationState::Failed(_))
    }

    /// Short name for logs and serialized views
    pub fn label(&self) -> &'static str {
        match self {
            CreationState::Idle => "idle",
            CreationState::Requesting => "requesting",
            CreationState::Succeeded => "succeeded",
            CreationState::Failed(_) => "failed",
        }
    }
}

/// Answer to a creation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Ask the user, then call `resolve_confirmation`
    Confirm,
    /// Another attempt is pending or a playlist exists already
    Refused(CreationState),
}

/// State machine that allows at most one playlist creation per room
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistCreationGuard {
    state: CreationState,
    result: Option<PlaylistCreationResult>,
    confirming: bool,
}

impl PlaylistCreationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &CreationState {
        &self.state
    }

    pub fn result(&self) -> Option<&PlaylistCreationResult> {
        self.result.as_ref()
    }

    /// Whether a confirmation prompt is waiting for an answer
    pub fn is_confirming(&self) -> bool {
        self.confirming
    }

    /// Start an attempt; only `Idle` and `Failed` admit one
    pub fn request_create(&mut self) -> Admission {
        if self.confirming {
            debug!("Playlist creation refused: confirmation already pending");
            return Admission::Refused(self.state.clone());
        }

        match self.state {
            CreationState::Idle | CreationState::Failed(_) => {
                self.confirming = true;
                Admission::Confirm
            }
            CreationState::Requesting | CreationState::Succeeded => {
                debug!("Playlist creation refused in state {}", self.state.label());
                Admission::Refused(self.state.clone())
            }
        }
    }

    /// Apply the user's answer; returns `true` when the request should be issued
    ///
    /// Declining leaves the guard `Idle`, including after a failure that has
    /// already been shown.
    pub fn resolve_confirmation(&mut self, confirmed: bool) -> bool {
        if !self.confirming {
            return false;
        }
        self.confirming = false;

        if confirmed {
            self.state = CreationState::Requesting;
        } else {
            self.state = CreationState::Idle;
        }
        confirmed
    }

    /// Forget a pending confirmation without answering it
    pub fn cancel_confirmation(&mut self) {
        self.confirming = false;
    }

    /// Record the outcome of the outstanding request
    ///
    /// Ignored unless a request is outstanding. A failure keeps any earlier result.
    pub fn complete(
        &mut self,
        outcome: std::result::Result<PlaylistCreationResult, SessionError>,
    ) -> &CreationState {
        if !self.state.is_requesting() {
            debug!(
                "Ignoring creation outcome in state {}",
                self.state.label()
            );
            return &self.state;
        }

        match outcome {
            Ok(result) => {
                self.result = Some(result);
                self.state = CreationState::Succeeded;
            }
            Err(error) => {
                self.state = CreationState::Failed(error);
            }
        }
        &self.state
    }

    /// `Failed → Idle` once the failure has been shown; returns whether it applied
    pub fn acknowledge_failure(&mut self) -> bool {
        if self.state.is_failed() {
            self.state = CreationState::Idle;
            true
        } else {
            false
        }
    }

    /// Back to `Idle` with no result, whatever the current state
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
