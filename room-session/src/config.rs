//! Configuration for room sessions

use std::time::Duration;

/// Question asked before a playlist is created on the user's account
pub const DEFAULT_CONFIRMATION_PROMPT: &str =
    "You are creating a playlist on your account, do you wish to continue?";

/// Link shown for a created playlist when the service returned none
pub const DEFAULT_PLACEHOLDER_LINK: &str = "#";

/// Configuration for a [`RoomSession`](crate::RoomSession)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Interval between background reconciliations
    /// Default: 10 seconds
    pub poll_interval: Duration,

    /// Prompt passed to the confirmation gate
    pub confirmation_prompt: String,

    /// Fallback link for playlists created without an external URL
    /// Default: "#"
    pub placeholder_link: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(10),
            confirmation_prompt: DEFAULT_CONFIRMATION_PROMPT.to_string(),
            placeholder_link: DEFAULT_PLACEHOLDER_LINK.to_string(),
        }
    }
}

impl SessionConfig {
    /// Create a new SessionConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Short interval, for rooms whose shared tracks are still being computed
    pub fn fast_polling() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            ..Default::default()
        }
    }

    /// Long interval, for clients that mostly sit idle
    pub fn resource_efficient() -> Self {
        Self {
            poll_interval: Duration::from_secs(60),
            ..Default::default()
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_confirmation_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.confirmation_prompt = prompt.into();
        self
    }

    pub fn with_placeholder_link(mut self, link: impl Into<String>) -> Self {
        self.placeholder_link = link.into();
        self
    }
}
