use std::time::Duration;

use anyhow::{Result, bail};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::debug;

use crate::app::{Activation, App, stepped_volume};
use crate::config;
use crate::engine::{EngineError, PlaybackSnapshot, Player};
use crate::ui;

/// State tracked by the runtime event loop across iterations.
#[derive(Debug, Default)]
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
}

/// Main terminal event loop: handles input and redraws from the latest
/// engine snapshot. Returns `Ok(())` when the user quits.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    player: &Player,
    state: &mut EventLoopState,
) -> Result<()> {
    loop {
        let snapshot = player.snapshot();
        app.observe(&snapshot);

        terminal.draw(|f| ui::draw(f, app, &snapshot, &settings.ui, &settings.player))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, player, &snapshot, state)? {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Surface a rejected command as a status message. A dead engine is fatal.
fn report(app: &mut App, result: Result<(), EngineError>) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(EngineError::Disconnected) => bail!("playback engine stopped unexpectedly"),
        Err(e) => {
            debug!(error = %e, "command rejected");
            app.show_toast(e.to_string());
            Ok(())
        }
    }
}

fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    player: &Player,
    snapshot: &PlaybackSnapshot,
    state: &mut EventLoopState,
) -> Result<bool> {
    if key.code != KeyCode::Char('g') {
        state.pending_gg = false;
    }

    match key.code {
        KeyCode::Char('q') => return Ok(true),
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                app.follow_playback_off();
                app.select_first();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => {
            app.follow_playback_off();
            app.select_last();
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.follow_playback_off();
            app.next();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.follow_playback_off();
            app.prev();
        }
        KeyCode::Enter => match app.activation(snapshot) {
            Activation::Toggle => report(app, player.toggle_playback())?,
            Activation::PlayFrom(index) => {
                app.follow_playback_on();
                let tracks = app.library.tracks().to_vec();
                report(app, player.play_queue(tracks, index))?;
            }
            Activation::Nothing => {}
        },
        KeyCode::Char('a') => {
            if app.has_tracks() {
                app.follow_playback_on();
                let tracks = app.library.tracks().to_vec();
                report(app, player.play_queue(tracks, 0))?;
            }
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => report(app, player.toggle_playback())?,
        KeyCode::Char('l') => {
            app.follow_playback_on();
            report(app, player.next())?;
        }
        KeyCode::Char('h') => {
            app.follow_playback_on();
            report(app, player.previous())?;
        }
        KeyCode::Char('L') => {
            let secs = settings.player.scrub_seconds as f64;
            report(app, player.seek_by(secs))?;
        }
        KeyCode::Char('H') => {
            let secs = settings.player.scrub_seconds as f64;
            report(app, player.seek_by(-secs))?;
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            let level = stepped_volume(snapshot.volume, settings.player.volume_step, true);
            report(app, player.set_volume(level))?;
        }
        KeyCode::Char('-') => {
            let level = stepped_volume(snapshot.volume, settings.player.volume_step, false);
            report(app, player.set_volume(level))?;
        }
        KeyCode::Char('m') => report(app, player.toggle_mute())?,
        _ => {}
    }

    Ok(false)
}
