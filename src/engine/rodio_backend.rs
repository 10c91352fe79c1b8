//! `rodio`-backed media primitive for local files.
//!
//! rodio has no callbacks, so metadata is reported right after a load and
//! progress/completion are derived from the sink whenever the engine polls.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lofty::prelude::AudioFile;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use tracing::{debug, warn};

use super::primitive::{MediaPrimitive, Notifier};
use super::types::{LoadTag, NotificationKind};

pub struct RodioPrimitive {
    stream: OutputStream,
    notifier: Notifier,
    sink: Option<Sink>,
    loaded: Option<LoadTag>,
    /// File behind the current sink, reopened when a drained sink is resumed.
    path: Option<PathBuf>,
    /// Why the current load produced no sink, reported when transport is requested.
    load_error: Option<String>,
    volume: f32,
    ended_reported: bool,
}

impl RodioPrimitive {
    /// Open the default output device.
    pub fn open(notifier: Notifier) -> Result<Self, rodio::StreamError> {
        let mut stream = OutputStreamBuilder::open_default_stream()?;
        // rodio logs to stderr when the stream is dropped, which garbles the TUI.
        stream.log_on_drop(false);

        Ok(Self {
            stream,
            notifier,
            sink: None,
            loaded: None,
            path: None,
            load_error: None,
            volume: 1.0,
            ended_reported: false,
        })
    }

    fn notify(&self, kind: NotificationKind) {
        if let Some(tag) = &self.loaded {
            self.notifier.notify(tag.clone(), kind);
        }
    }
}

impl MediaPrimitive for RodioPrimitive {
    fn load(&mut self, tag: LoadTag, locator: &str) {
        if let Some(old) = self.sink.take() {
            old.stop();
        }
        self.loaded = Some(tag);
        self.path = None;
        self.load_error = None;
        self.ended_reported = false;

        let path = match resolve_locator(locator) {
            Ok(p) => p,
            Err(e) => {
                self.load_error = Some(e);
                return;
            }
        };
        let source = match open_source(&path) {
            Ok(s) => s,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot open track");
                self.load_error = Some(e);
                return;
            }
        };

        let duration = source.total_duration().or_else(|| probe_duration(&path));
        let sink = Sink::connect_new(self.stream.mixer());
        sink.set_volume(self.volume);
        sink.append(source);
        sink.pause();
        self.sink = Some(sink);
        self.path = Some(path.clone());

        match duration {
            Some(d) => self.notify(NotificationKind::Duration(d.as_secs_f64())),
            None => debug!(path = %path.display(), "duration unknown"),
        }
    }

    fn play(&mut self) {
        let Some(sink) = &self.sink else {
            let reason = self
                .load_error
                .clone()
                .unwrap_or_else(|| "nothing loaded".to_string());
            self.notify(NotificationKind::StartFailed(reason));
            return;
        };

        // Resuming after the end replays the track from the start.
        if let Some(path) = &self.path {
            match refill_if_drained(sink, path) {
                Ok(true) => {
                    debug!(path = %path.display(), "replaying finished track");
                    self.ended_reported = false;
                }
                Ok(false) => {}
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "cannot replay track");
                    self.notify(NotificationKind::StartFailed(e));
                    return;
                }
            }
        }
        sink.play();
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    fn set_position(&mut self, seconds: f64) {
        if !seconds.is_finite() || seconds < 0.0 {
            return;
        }
        if let Some(sink) = &self.sink {
            if let Err(e) = sink.try_seek(Duration::from_secs_f64(seconds)) {
                warn!(seconds, error = %e, "seek failed");
                return;
            }
            self.ended_reported = false;
        }
    }

    fn set_volume(&mut self, level: f32) {
        self.volume = level;
        if let Some(sink) = &self.sink {
            sink.set_volume(level);
        }
    }

    fn poll(&mut self) {
        let Some(sink) = &self.sink else {
            return;
        };
        if sink.is_paused() {
            return;
        }
        if sink.empty() {
            if !self.ended_reported {
                self.ended_reported = true;
                self.notify(NotificationKind::Ended);
            }
        } else {
            let pos = sink.get_pos().as_secs_f64();
            self.notify(NotificationKind::Position(pos));
        }
    }

    fn release(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.loaded = None;
        self.path = None;
    }
}

/// Map a locator to a local path. Accepts plain paths and `file://` URLs.
pub(crate) fn resolve_locator(locator: &str) -> Result<PathBuf, String> {
    if let Some(rest) = locator.strip_prefix("file://") {
        return Ok(PathBuf::from(rest));
    }
    if locator.contains("://") {
        return Err(format!("unsupported locator: {locator}"));
    }
    if locator.trim().is_empty() {
        return Err("empty locator".to_string());
    }
    Ok(PathBuf::from(locator))
}

fn open_source(path: &Path) -> Result<Decoder<BufReader<File>>, String> {
    let file = File::open(path).map_err(|e| format!("failed to open {}: {e}", path.display()))?;
    Decoder::new(BufReader::new(file)).map_err(|e| format!("failed to decode {}: {e}", path.display()))
}

/// Queue `path` again when `sink` has played everything. Returns whether it did.
fn refill_if_drained(sink: &Sink, path: &Path) -> Result<bool, String> {
    if !sink.empty() {
        return Ok(false);
    }
    sink.append(open_source(path)?);
    Ok(true)
}

/// Fall back to container properties when the decoder cannot tell the length.
fn probe_duration(path: &Path) -> Option<Duration> {
    lofty::read_from_path(path)
        .ok()
        .map(|tagged| tagged.properties().duration())
        .filter(|d| !d.is_zero())
}
