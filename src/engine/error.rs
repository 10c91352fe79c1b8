use thiserror::Error;

use super::types::{LoadTag, TrackId};

/// Why a command could not be applied in the current state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidOperation {
    #[error("no active track to {operation}")]
    NoActiveTrack { operation: &'static str },
    #[error("volume {level} is outside 0.0..=1.0")]
    VolumeOutOfRange { level: f32 },
    #[error("cannot seek to non-finite position {seconds}")]
    NonFiniteSeek { seconds: f64 },
}

/// Errors surfaced by the playback engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Rejected synchronously; the engine state is unchanged.
    #[error(transparent)]
    InvalidOperation(#[from] InvalidOperation),
    /// The media primitive refused to start or resume transport.
    #[error("playback of {track} was rejected: {reason}")]
    PlaybackRejected { track: TrackId, reason: String },
    /// A notification for a load that is no longer current; callers drop it.
    #[error("stale notification for load {tag}")]
    StaleNotification { tag: LoadTag },
    /// The media primitive could not be constructed.
    #[error("media primitive unavailable: {0}")]
    PrimitiveUnavailable(String),
    /// The engine thread is gone.
    #[error("playback engine is not running")]
    Disconnected,
}

impl EngineError {
    pub(super) fn no_active_track(operation: &'static str) -> Self {
        InvalidOperation::NoActiveTrack { operation }.into()
    }
}
