use std::path::{Path, PathBuf};

use crate::config::LibrarySettings;
use crate::engine::{Track, TrackId};

use super::scan::scan;

/// Tracks found under one music directory, in listing order.
///
/// The whole library doubles as the "play all" playlist.
pub struct Library {
    root: PathBuf,
    tracks: Vec<Track>,
}

impl Library {
    pub fn load(root: &Path, settings: &LibrarySettings) -> Self {
        Self::from_tracks(root.to_path_buf(), scan(root, settings))
    }

    pub fn from_tracks(root: PathBuf, tracks: Vec<Track>) -> Self {
        Self { root, tracks }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn position_of(&self, id: &TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| &t.id == id)
    }
}
