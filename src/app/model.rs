//! Application model: cursor over the library plus transient status text.

use std::time::{Duration, Instant};

use crate::engine::{PlaybackSnapshot, Track};
use crate::library::Library;

/// How long a status message stays on screen.
const TOAST_TTL: Duration = Duration::from_secs(4);

/// What pressing enter on the selected row should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// The row is already the active track: pause or resume it.
    Toggle,
    /// Start the whole library as the queue from this index.
    PlayFrom(usize),
    Nothing,
}

#[derive(Debug, Clone)]
struct Toast {
    text: String,
    shown_at: Instant,
}

/// The main application model.
pub struct App {
    pub library: Library,
    pub selected: usize,
    /// Whether the cursor jumps to the active track as playback moves on.
    pub follow_playback: bool,

    toast: Option<Toast>,
    /// Refusal count from the last observed snapshot.
    seen_rejections: u64,
}

impl App {
    pub fn new(library: Library) -> Self {
        Self {
            library,
            selected: 0,
            follow_playback: true,
            toast: None,
            seen_rejections: 0,
        }
    }

    pub fn has_tracks(&self) -> bool {
        !self.library.is_empty()
    }

    pub fn selected_track(&self) -> Option<&Track> {
        self.library.get(self.selected)
    }

    /// Move the cursor down, wrapping to the top.
    pub fn next(&mut self) {
        if self.has_tracks() {
            self.selected = (self.selected + 1) % self.library.len();
        }
    }

    /// Move the cursor up, wrapping to the bottom.
    pub fn prev(&mut self) {
        if self.has_tracks() {
            self.selected = match self.selected {
                0 => self.library.len() - 1,
                i => i - 1,
            };
        }
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.library.len().saturating_sub(1);
    }

    pub fn follow_playback_on(&mut self) {
        self.follow_playback = true;
    }

    pub fn follow_playback_off(&mut self) {
        self.follow_playback = false;
    }

    /// Decide what enter on the selected row means given the current playback.
    pub fn activation(&self, snapshot: &PlaybackSnapshot) -> Activation {
        let Some(track) = self.selected_track() else {
            return Activation::Nothing;
        };
        match &snapshot.active_track {
            Some(active) if active.id == track.id => Activation::Toggle,
            _ => Activation::PlayFrom(self.selected),
        }
    }

    /// Sync with a fresh engine snapshot: follow the active track and turn a
    /// new playback rejection into a status message.
    pub fn observe(&mut self, snapshot: &PlaybackSnapshot) {
        if self.follow_playback {
            if let Some(i) = snapshot
                .active_track
                .as_ref()
                .and_then(|t| self.library.position_of(&t.id))
            {
                self.selected = i;
            }
        }

        if snapshot.rejections != self.seen_rejections {
            self.seen_rejections = snapshot.rejections;
            let reason = snapshot.last_rejection.as_deref().unwrap_or("unknown error");
            self.show_toast(format!("Playback failed: {reason}"));
        }
    }

    pub fn show_toast(&mut self, text: impl Into<String>) {
        self.toast = Some(Toast {
            text: text.into(),
            shown_at: Instant::now(),
        });
    }

    /// Current status message, if it has not expired yet.
    pub fn toast_text(&self) -> Option<&str> {
        self.toast_text_at(Instant::now())
    }

    pub(super) fn toast_text_at(&self, now: Instant) -> Option<&str> {
        self.toast
            .as_ref()
            .filter(|t| now.saturating_duration_since(t.shown_at) < TOAST_TTL)
            .map(|t| t.text.as_str())
    }
}

/// Volume after one step up or down, kept inside 0.0..=1.0.
pub fn stepped_volume(current: f32, step: f32, up: bool) -> f32 {
    let next = if up { current + step } else { current - step };
    // Snap to two decimals so repeated steps do not drift.
    ((next * 100.0).round() / 100.0).clamp(0.0, 1.0)
}
