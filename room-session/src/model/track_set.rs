//! The ordered, duplicate-free set of tracks shared by a room

use std::collections::HashSet;

use room_api::{Track, TrackId};

use crate::ordering;

/// Tracks common to every member of a room, in display order
///
/// Built wholesale from each server report: duplicates (by [`TrackId`]) are
/// dropped keeping the first occurrence, then the remainder is sorted by
/// artists. It is never patched incrementally.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharedTrackSet {
    tracks: Vec<Track>,
}

impl SharedTrackSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the set from tracks in server order
    pub fn from_server(tracks: Vec<Track>) -> Self {
        let reported = tracks.len();
        let mut seen = HashSet::with_capacity(reported);
        let mut tracks: Vec<Track> = tracks
            .into_iter()
            .filter(|t| seen.insert(t.id.clone()))
            .collect();

        if tracks.len() != reported {
            tracing::debug!(
                "Dropped {} duplicate tracks from server report",
                reported - tracks.len()
            );
        }

        ordering::sort_tracks(&mut tracks);
        Self { tracks }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    pub fn as_slice(&self) -> &[Track] {
        &self.tracks
    }

    pub fn get(&self, id: &TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| &t.id == id)
    }

    pub fn contains(&self, id: &TrackId) -> bool {
        self.get(id).is_some()
    }

    /// Track ids in display order
    pub fn ids(&self) -> Vec<TrackId> {
        self.tracks.iter().map(|t| t.id.clone()).collect()
    }
}

impl<'a> IntoIterator for &'a SharedTrackSet {
    type Item = &'a Track;
    type IntoIter = std::slice::Iter<'a, Track>;

    fn into_iter(self) -> Self::IntoIter {
        self.tracks.iter()
    }
}
