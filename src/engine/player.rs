use std::fmt;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use super::error::EngineError;
use super::primitive::{MediaPrimitive, Notifier};
use super::state::Engine;
use super::types::{Notification, PlaybackSnapshot, SnapshotHandle, Track};

/// Commands accepted by the engine thread.
#[derive(Debug)]
pub enum EngineCmd {
    /// Play a single track without touching the queue.
    PlayTrack(Track),
    /// Replace the queue and start at the given index.
    PlayQueue { tracks: Vec<Track>, start: usize },
    TogglePlayback,
    Next,
    Previous,
    /// Seek to an absolute position in seconds.
    Seek(f64),
    /// Seek relative to the current position (seconds, positive or negative).
    SeekBy(f64),
    SetVolume(f32),
    ToggleMute,
}

type Reply = Sender<Result<(), EngineError>>;

/// Everything the engine thread consumes, in arrival order.
pub(crate) enum Envelope {
    Command(EngineCmd, Reply),
    Notify(Notification),
    Shutdown,
}

/// Handle to the engine thread.
///
/// The thread owns the [`Engine`] and its media primitive; commands and
/// primitive notifications share one inbox, so they are applied strictly in
/// order. Dropping the handle stops playback and releases the primitive.
pub struct Player {
    tx: Sender<Envelope>,
    snapshot: SnapshotHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl Player {
    /// Spawn the engine thread.
    ///
    /// `make_primitive` runs on the engine thread, since audio outputs are
    /// usually tied to the thread that opened them. `tick` is the interval at
    /// which the primitive is polled for progress.
    pub fn spawn<P, E, F>(volume: f32, tick: Duration, make_primitive: F) -> Result<Self, EngineError>
    where
        P: MediaPrimitive + 'static,
        E: fmt::Display + 'static,
        F: FnOnce(Notifier) -> Result<P, E> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<Envelope>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), String>>();
        let snapshot: SnapshotHandle = Arc::new(Mutex::new(PlaybackSnapshot::default()));

        let notifier = Notifier::new(tx.clone());
        let snapshot_for_thread = snapshot.clone();
        let handle = thread::spawn(move || {
            let primitive = match make_primitive(notifier) {
                Ok(p) => p,
                Err(e) => {
                    let _ = ready_tx.send(Err(e.to_string()));
                    return;
                }
            };
            let _ = ready_tx.send(Ok(()));
            run_engine(Engine::new(primitive, volume), rx, snapshot_for_thread, tick);
        });

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                tx,
                snapshot,
                join: Mutex::new(Some(handle)),
            }),
            Ok(Err(reason)) => {
                let _ = handle.join();
                Err(EngineError::PrimitiveUnavailable(reason))
            }
            Err(_) => {
                let _ = handle.join();
                Err(EngineError::PrimitiveUnavailable(
                    "engine thread exited during startup".to_string(),
                ))
            }
        }
    }

    pub fn play_track(&self, track: Track) -> Result<(), EngineError> {
        self.request(EngineCmd::PlayTrack(track))
    }

    pub fn play_queue(&self, tracks: Vec<Track>, start: usize) -> Result<(), EngineError> {
        self.request(EngineCmd::PlayQueue { tracks, start })
    }

    pub fn toggle_playback(&self) -> Result<(), EngineError> {
        self.request(EngineCmd::TogglePlayback)
    }

    pub fn next(&self) -> Result<(), EngineError> {
        self.request(EngineCmd::Next)
    }

    pub fn previous(&self) -> Result<(), EngineError> {
        self.request(EngineCmd::Previous)
    }

    pub fn seek(&self, seconds: f64) -> Result<(), EngineError> {
        self.request(EngineCmd::Seek(seconds))
    }

    pub fn seek_by(&self, delta: f64) -> Result<(), EngineError> {
        self.request(EngineCmd::SeekBy(delta))
    }

    pub fn set_volume(&self, level: f32) -> Result<(), EngineError> {
        self.request(EngineCmd::SetVolume(level))
    }

    pub fn toggle_mute(&self) -> Result<(), EngineError> {
        self.request(EngineCmd::ToggleMute)
    }

    /// Latest published state.
    pub fn snapshot(&self) -> PlaybackSnapshot {
        match self.snapshot.lock() {
            Ok(s) => s.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Stop the engine thread and wait for it to release the primitive.
    pub fn shutdown(&self) {
        let _ = self.tx.send(Envelope::Shutdown);

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                if h.join().is_err() {
                    warn!("engine thread panicked");
                }
            }
        }
    }

    /// Send `cmd` and wait for the engine to apply it.
    fn request(&self, cmd: EngineCmd) -> Result<(), EngineError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.tx
            .send(Envelope::Command(cmd, reply_tx))
            .map_err(|_| EngineError::Disconnected)?;
        reply_rx.recv().map_err(|_| EngineError::Disconnected)?
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_engine<P: MediaPrimitive>(
    mut engine: Engine<P>,
    rx: Receiver<Envelope>,
    snapshot: SnapshotHandle,
    tick: Duration,
) {
    let tick = tick.max(Duration::from_millis(1));
    let mut next_poll = Instant::now() + tick;
    publish(&engine, &snapshot);

    loop {
        let wait = next_poll.saturating_duration_since(Instant::now());
        match rx.recv_timeout(wait) {
            Ok(Envelope::Command(cmd, reply)) => {
                let result = apply(&mut engine, cmd);
                // Publish before replying so the caller never reads an older state.
                publish(&engine, &snapshot);
                let _ = reply.send(result);
            }
            Ok(Envelope::Notify(notification)) => match engine.handle_notification(notification) {
                Ok(()) => {}
                Err(EngineError::StaleNotification { tag }) => {
                    trace!(%tag, "discarding stale notification");
                }
                Err(e) => debug!(error = %e, "notification surfaced to ui"),
            },
            Ok(Envelope::Shutdown) => break,
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if Instant::now() >= next_poll {
            engine.poll();
            next_poll = Instant::now() + tick;
        }
        publish(&engine, &snapshot);
    }

    debug!("engine thread shutting down");
    engine.release();
    publish(&engine, &snapshot);
}

fn apply<P: MediaPrimitive>(engine: &mut Engine<P>, cmd: EngineCmd) -> Result<(), EngineError> {
    trace!(?cmd, "command");
    match cmd {
        EngineCmd::PlayTrack(track) => engine.play_track(track),
        EngineCmd::PlayQueue { tracks, start } => engine.play_queue(tracks, start),
        EngineCmd::TogglePlayback => return engine.toggle_playback(),
        EngineCmd::Next => engine.next(),
        EngineCmd::Previous => engine.previous(),
        EngineCmd::Seek(seconds) => return engine.seek(seconds),
        EngineCmd::SeekBy(delta) => return engine.seek_by(delta),
        EngineCmd::SetVolume(level) => return engine.set_volume(level),
        EngineCmd::ToggleMute => return engine.toggle_mute(),
    }
    Ok(())
}

/// Overwrite the shared snapshot. A poisoned lock is taken over, not skipped.
pub(super) fn publish<P: MediaPrimitive>(engine: &Engine<P>, snapshot: &SnapshotHandle) {
    let mut s = snapshot.lock().unwrap_or_else(PoisonError::into_inner);
    *s = engine.snapshot();
}
