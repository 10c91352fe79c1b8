use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::App;
use crate::engine::{Player, RodioPrimitive};
use crate::library::Library;

mod event_loop;
mod logging;
mod settings;

pub fn run() -> Result<()> {
    let (settings, warning) = settings::load_settings();

    let log_path = logging::init_logging(&settings.logging)?;
    if let Some(msg) = warning {
        warn!("{msg}");
    }
    if let Some(path) = &log_path {
        info!(path = %path.display(), "logging initialised");
    }

    let dir = match env::args_os().nth(1) {
        Some(arg) => PathBuf::from(arg),
        None => env::current_dir().context("resolve current directory")?,
    };

    let library = Library::load(&dir, &settings.library);
    let player = Player::spawn(
        settings.player.default_volume,
        Duration::from_millis(settings.player.tick_ms),
        RodioPrimitive::open,
    )
    .context("start playback engine")?;
    let mut app = App::new(library);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = event_loop::EventLoopState::default();
    let run_result = event_loop::run(&mut terminal, &settings, &mut app, &player, &mut state);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    player.shutdown();
    info!("shut down");
    run_result
}
