//! Preview playback selection
//!
//! At most one preview is selected at a time. The selector only records which
//! media reference is requested; the [`PreviewPlayer`] collaborator turns a
//! selection change into audio. Repeating the current selection is not a
//! change, so the player is never restarted by a double click.

use room_api::{MediaRef, Track};
use tracing::debug;

use crate::model::SharedTrackSet;

/// Plays preview audio on behalf of a session
///
/// Called while the session holds its state lock: implementations must return
/// quickly and must not call back into the session.
pub trait PreviewPlayer: Send + Sync {
    /// Start playing `media`, replacing whatever was playing
    fn play(&self, media: &MediaRef);

    /// Stop playback
    fn stop(&self);
}

/// Player that does nothing, for headless sessions
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPlayer;

impl PreviewPlayer for NoopPlayer {
    fn play(&self, _media: &MediaRef) {}

    fn stop(&self) {}
}

/// What a selection request did to the current selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionChange {
    /// A new preview was selected
    Started(MediaRef),
    /// The selection was cleared
    Stopped,
    /// The request matched the current selection
    Unchanged,
    /// The track is no longer shared by the room; nothing changed
    IgnoredStale,
}

impl SelectionChange {
    /// Forward the change to a player; no-op changes are not forwarded
    pub fn apply(&self, player: &dyn PreviewPlayer) {
        match self {
            SelectionChange::Started(media) => player.play(media),
            SelectionChange::Stopped => player.stop(),
            SelectionChange::Unchanged | SelectionChange::IgnoredStale => {}
        }
    }

    pub fn is_change(&self) -> bool {
        matches!(self, SelectionChange::Started(_) | SelectionChange::Stopped)
    }
}

/// Tracks the single preview currently requested
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackSelector {
    current: Option<MediaRef>,
}

impl PlaybackSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&MediaRef> {
        self.current.as_ref()
    }

    /// Select `track` for preview if it is still part of `tracks`
    ///
    /// The media reference is taken from the set, not from the caller's copy.
    /// A track without preview audio clears the selection.
    pub fn select(&mut self, track: &Track, tracks: &SharedTrackSet) -> SelectionChange {
        let Some(shared) = tracks.get(&track.id) else {
            debug!("Ignoring selection of track {} no longer shared", track.id);
            return SelectionChange::IgnoredStale;
        };

        match &shared.media {
            Some(media) if self.current.as_ref() == Some(media) => SelectionChange::Unchanged,
            Some(media) => {
                self.current = Some(media.clone());
                SelectionChange::Started(media.clone())
            }
            None => self.clear(),
        }
    }

    pub fn clear(&mut self) -> SelectionChange {
        match self.current.take() {
            Some(_) => SelectionChange::Stopped,
            None => SelectionChange::Unchanged,
        }
    }
}
