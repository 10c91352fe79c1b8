//! Engine-facing data types.
//!
//! Tracks arrive already resolved from a repository and are never mutated
//! here. Everything the UI needs to render comes out as a
//! [`PlaybackSnapshot`], published through a [`SnapshotHandle`].

use std::fmt;
use std::sync::{Arc, Mutex};

/// Default volume applied when the engine starts.
pub const DEFAULT_VOLUME: f32 = 0.7;

/// Opaque track identity as handed out by the repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackId(pub String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A playable item.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub artist: String,
    /// Streamable resource reference understood by the media primitive.
    pub locator: String,
    /// Duration recorded by the repository; advisory until the primitive reports one.
    pub nominal_duration: f64,
}

/// Identifies one load issued to the media primitive.
///
/// Every notification echoes the tag of the load it belongs to, so the engine
/// can tell a late event for a superseded load apart from a current one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTag {
    pub generation: u64,
    pub track: TrackId,
}

impl fmt::Display for LoadTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.track, self.generation)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NotificationKind {
    /// Elapsed time in seconds.
    Position(f64),
    /// Total duration in seconds, as reported by the primitive's metadata.
    Duration(f64),
    /// The loaded resource played to completion.
    Ended,
    /// Starting or resuming transport was refused.
    StartFailed(String),
}

/// Asynchronous report from the media primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub tag: LoadTag,
    pub kind: NotificationKind,
}

/// Observable transport state derived from [`PlaybackSnapshot`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum TransportState {
    #[default]
    Idle,
    /// A load was commanded but the primitive has not reported metadata yet.
    Loading,
    Playing,
    Paused,
}

/// Read-only view of the engine state for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSnapshot {
    pub active_track: Option<Track>,
    pub queue: Vec<Track>,
    pub is_playing: bool,
    pub position_seconds: f64,
    /// 0 until the primitive reports a duration for the active load.
    pub duration_seconds: f64,
    pub duration_known: bool,
    pub volume: f32,
    pub transport: TransportState,
    /// Reason for the most recent refused start, cleared by the next load or resume.
    pub last_rejection: Option<String>,
    /// Number of refused starts so far. Bumped on every refusal, even with a repeated reason.
    pub rejections: u64,
}

impl Default for PlaybackSnapshot {
    fn default() -> Self {
        Self {
            active_track: None,
            queue: Vec::new(),
            is_playing: false,
            position_seconds: 0.0,
            duration_seconds: 0.0,
            duration_known: false,
            volume: DEFAULT_VOLUME,
            transport: TransportState::Idle,
            last_rejection: None,
            rejections: 0,
        }
    }
}

impl PlaybackSnapshot {
    /// Duration to show: the reported one, or the track's nominal duration before that.
    pub fn display_duration(&self) -> f64 {
        if self.duration_known {
            return self.duration_seconds;
        }
        self.active_track
            .as_ref()
            .map(|t| t.nominal_duration)
            .unwrap_or(0.0)
    }

    /// Index of the active track inside the queue, if it is a member.
    pub fn queue_position(&self) -> Option<usize> {
        let active = self.active_track.as_ref()?;
        self.queue.iter().position(|t| t.id == active.id)
    }
}

pub type SnapshotHandle = Arc<Mutex<PlaybackSnapshot>>;
