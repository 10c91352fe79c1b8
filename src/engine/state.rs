//! The transport state machine.
//!
//! `Engine` is synchronous and single-owner: every command and every
//! primitive notification is applied through `&mut self`, in order. The
//! threading lives in [`super::player`].

use tracing::{debug, info, warn};

use super::error::{EngineError, InvalidOperation};
use super::navigation::{next_index, previous_index};
use super::primitive::MediaPrimitive;
use super::types::{
    DEFAULT_VOLUME, LoadTag, Notification, NotificationKind, PlaybackSnapshot, Track,
    TransportState,
};

pub struct Engine<P: MediaPrimitive> {
    primitive: P,
    released: bool,

    active: Option<Track>,
    active_tag: Option<LoadTag>,
    queue: Vec<Track>,
    is_playing: bool,
    position: f64,
    /// `None` until the primitive reports metadata for the active load.
    duration: Option<f64>,

    volume: f32,
    /// Level restored when unmuting.
    unmute_volume: f32,

    generation: u64,
    last_rejection: Option<String>,
    rejections: u64,
}

impl<P: MediaPrimitive> Engine<P> {
    /// Bind `primitive` and apply the starting volume (clamped into 0.0..=1.0).
    pub fn new(mut primitive: P, volume: f32) -> Self {
        let volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            DEFAULT_VOLUME
        };
        primitive.set_volume(volume);

        Self {
            primitive,
            released: false,
            active: None,
            active_tag: None,
            queue: Vec::new(),
            is_playing: false,
            position: 0.0,
            duration: None,
            volume,
            unmute_volume: if volume > 0.0 { volume } else { DEFAULT_VOLUME },
            generation: 0,
            last_rejection: None,
            rejections: 0,
        }
    }

    /// Load `track` and start transport. Anything still in flight for the
    /// previous load becomes stale.
    pub fn play_track(&mut self, track: Track) {
        self.generation += 1;
        let tag = LoadTag {
            generation: self.generation,
            track: track.id.clone(),
        };
        info!(track = %track.id, title = %track.title, generation = tag.generation, "play track");

        self.primitive.load(tag.clone(), &track.locator);
        self.primitive.play();

        self.active = Some(track);
        self.active_tag = Some(tag);
        self.is_playing = true;
        self.position = 0.0;
        self.duration = None;
        self.last_rejection = None;
    }

    /// Replace the queue and start playing at `start`. An empty `tracks` is ignored.
    pub fn play_queue(&mut self, tracks: Vec<Track>, start: usize) {
        if tracks.is_empty() {
            debug!("play_queue with no tracks ignored");
            return;
        }
        debug!(len = tracks.len(), start, "replacing queue");
        self.queue = tracks;
        if let Some(track) = self.queue.get(start).cloned() {
            self.play_track(track);
        }
    }

    pub fn toggle_playback(&mut self) -> Result<(), EngineError> {
        if self.active.is_none() {
            return Err(EngineError::no_active_track("toggle playback"));
        }
        if self.is_playing {
            self.primitive.pause();
            self.is_playing = false;
        } else {
            self.primitive.play();
            self.is_playing = true;
            self.last_rejection = None;
        }
        debug!(playing = self.is_playing, "toggled playback");
        Ok(())
    }

    /// Advance to the following queue entry, wrapping to the start.
    pub fn next(&mut self) {
        let Some(active) = self.active.as_ref() else {
            return;
        };
        if let Some(i) = next_index(&self.queue, &active.id) {
            let track = self.queue[i].clone();
            self.play_track(track);
        }
    }

    /// Step back to the preceding queue entry, wrapping to the end.
    pub fn previous(&mut self) {
        let Some(active) = self.active.as_ref() else {
            return;
        };
        if let Some(i) = previous_index(&self.queue, &active.id) {
            let track = self.queue[i].clone();
            self.play_track(track);
        }
    }

    /// Relocate within the active track. The target is clamped to
    /// `[0, duration]`; only the lower bound applies while the duration is unknown.
    pub fn seek(&mut self, seconds: f64) -> Result<(), EngineError> {
        if self.active.is_none() {
            return Err(EngineError::no_active_track("seek"));
        }
        if !seconds.is_finite() {
            return Err(InvalidOperation::NonFiniteSeek { seconds }.into());
        }

        let target = self.clamp_position(seconds);
        self.primitive.set_position(target);
        self.position = target;
        debug!(requested = seconds, target, "seek");
        Ok(())
    }

    pub fn seek_by(&mut self, delta: f64) -> Result<(), EngineError> {
        self.seek(self.position + delta)
    }

    pub fn set_volume(&mut self, level: f32) -> Result<(), EngineError> {
        if !(0.0..=1.0).contains(&level) {
            return Err(InvalidOperation::VolumeOutOfRange { level }.into());
        }
        self.primitive.set_volume(level);
        self.volume = level;
        if level > 0.0 {
            self.unmute_volume = level;
        }
        Ok(())
    }

    /// Mute, or restore the last audible level.
    pub fn toggle_mute(&mut self) -> Result<(), EngineError> {
        if self.volume > 0.0 {
            self.set_volume(0.0)
        } else {
            self.set_volume(self.unmute_volume)
        }
    }

    /// Apply a primitive notification.
    ///
    /// Returns `StaleNotification` for events tagged with a superseded load
    /// (nothing is changed) and `PlaybackRejected` when the primitive refused
    /// to start; in that case `is_playing` has already been reverted.
    pub fn handle_notification(&mut self, notification: Notification) -> Result<(), EngineError> {
        let Notification { tag, kind } = notification;
        if self.active_tag.as_ref() != Some(&tag) {
            return Err(EngineError::StaleNotification { tag });
        }

        match kind {
            NotificationKind::Position(seconds) => {
                if seconds.is_finite() {
                    self.position = self.clamp_position(seconds);
                }
            }
            NotificationKind::Duration(seconds) => {
                if seconds.is_finite() && seconds >= 0.0 {
                    debug!(%tag, seconds, "duration known");
                    self.duration = Some(seconds);
                    self.position = self.position.min(seconds);
                } else {
                    debug!(%tag, seconds, "ignoring unusable duration");
                }
            }
            NotificationKind::Ended => {
                debug!(%tag, "track ended");
                if let Some(d) = self.duration {
                    self.position = d;
                }
                if self.queue.is_empty() {
                    self.is_playing = false;
                } else {
                    self.next();
                }
            }
            NotificationKind::StartFailed(reason) => {
                warn!(%tag, %reason, "playback rejected");
                self.is_playing = false;
                self.last_rejection = Some(reason.clone());
                self.rejections += 1;
                return Err(EngineError::PlaybackRejected {
                    track: tag.track,
                    reason,
                });
            }
        }
        Ok(())
    }

    /// Give a polled primitive the chance to report progress.
    pub fn poll(&mut self) {
        if !self.released {
            self.primitive.poll();
        }
    }

    /// Stop transport and release the primitive. Idempotent; also run on drop.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.primitive.pause();
        self.primitive.release();
        self.released = true;
        self.is_playing = false;
        debug!("media primitive released");
    }

    pub fn transport(&self) -> TransportState {
        match (&self.active, self.is_playing) {
            (None, _) => TransportState::Idle,
            (Some(_), true) if self.duration.is_none() => TransportState::Loading,
            (Some(_), true) => TransportState::Playing,
            (Some(_), false) => TransportState::Paused,
        }
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            active_track: self.active.clone(),
            queue: self.queue.clone(),
            is_playing: self.is_playing,
            position_seconds: self.position,
            duration_seconds: self.duration.unwrap_or(0.0),
            duration_known: self.duration.is_some(),
            volume: self.volume,
            transport: self.transport(),
            last_rejection: self.last_rejection.clone(),
            rejections: self.rejections,
        }
    }

    pub fn active_track(&self) -> Option<&Track> {
        self.active.as_ref()
    }

    pub fn queue(&self) -> &[Track] {
        &self.queue
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn duration(&self) -> f64 {
        self.duration.unwrap_or(0.0)
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Tag of the load currently bound, if any.
    pub fn current_tag(&self) -> Option<&LoadTag> {
        self.active_tag.as_ref()
    }

    fn clamp_position(&self, seconds: f64) -> f64 {
        let lower = seconds.max(0.0);
        match self.duration {
            Some(d) => lower.min(d),
            None => lower,
        }
    }
}

impl<P: MediaPrimitive> Drop for Engine<P> {
    fn drop(&mut self) {
        self.release();
    }
}
