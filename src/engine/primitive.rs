//! Seam between the engine and whatever actually produces sound.

use std::sync::mpsc::Sender;

use super::player::Envelope;
use super::types::{LoadTag, Notification, NotificationKind};

/// A stateful transport object driven by the engine.
///
/// Commands are fire-and-forget. Outcomes (metadata, progress, completion,
/// refusal to start) come back later through the [`Notifier`] the primitive
/// was built with, tagged with the [`LoadTag`] of the load they concern.
pub trait MediaPrimitive {
    /// Replace whatever is loaded with `locator`. Transport stays paused.
    fn load(&mut self, tag: LoadTag, locator: &str);
    fn play(&mut self);
    fn pause(&mut self);
    fn set_position(&mut self, seconds: f64);
    fn set_volume(&mut self, level: f32);

    /// Called periodically by the engine thread so polled backends can emit
    /// position and end-of-track notifications.
    fn poll(&mut self) {}

    /// Stop transport and free output resources. Called once on teardown.
    fn release(&mut self);
}

/// Sending half of the engine's inbox, handed to a primitive at construction.
#[derive(Clone)]
pub struct Notifier {
    tx: Sender<Envelope>,
}

impl Notifier {
    pub(super) fn new(tx: Sender<Envelope>) -> Self {
        Self { tx }
    }

    pub fn notify(&self, tag: LoadTag, kind: NotificationKind) {
        // The engine thread may already be shutting down.
        let _ = self.tx.send(Envelope::Notify(Notification { tag, kind }));
    }
}
