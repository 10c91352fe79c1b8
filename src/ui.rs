//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`: the
//! library list on top and the transport bar pinned to the bottom.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};

use crate::app::App;
use crate::config::{PlayerSettings, UiSettings};
use crate::engine::{PlaybackSnapshot, TransportState};
use crate::library::artist_label;

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    [
        "[j/k] up/down".to_string(),
        "[gg/G] top/bottom".to_string(),
        "[enter] play/toggle".to_string(),
        "[a] play all".to_string(),
        "[space/p] play/pause".to_string(),
        "[h/l] prev/next".to_string(),
        format!("[H/L] scrub -/+{scrub_seconds}s"),
        "[+/-] volume".to_string(),
        "[m] mute".to_string(),
        "[q] quit".to_string(),
    ]
    .join(" | ")
}

/// Format seconds as `m:ss`. Anything that is not a finite, non-negative
/// number renders as `0:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

fn progress_ratio(position: f64, duration: f64) -> f64 {
    if duration > 0.0 && position.is_finite() {
        (position / duration).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn volume_text(volume: f32) -> String {
    if volume <= 0.0 {
        "Muted".to_string()
    } else {
        format!("Vol {:.0}%", volume * 100.0)
    }
}

fn transport_label(state: TransportState) -> &'static str {
    match state {
        TransportState::Idle => "Idle",
        TransportState::Loading => "Loading…",
        TransportState::Playing => "Playing",
        TransportState::Paused => "Paused",
    }
}

/// Render the entire UI into the provided `frame`.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    snapshot: &PlaybackSnapshot,
    ui_settings: &UiSettings,
    player_settings: &PlayerSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(4),
            Constraint::Length(4),
        ])
        .split(frame.area());

    draw_library(frame, app, snapshot, ui_settings, chunks[0]);
    draw_transport(frame, app, snapshot, chunks[1]);

    let footer = Paragraph::new(controls_text(player_settings.scrub_seconds))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[2]);
}

fn draw_library(
    frame: &mut Frame,
    app: &App,
    snapshot: &PlaybackSnapshot,
    ui_settings: &UiSettings,
    area: Rect,
) {
    let title = format!(
        "{}({} songs • {}) ",
        ui_settings.header_text,
        app.library.len(),
        app.library.root().display()
    );
    let block = Block::default().borders(Borders::ALL).title(title);

    if !app.has_tracks() {
        let empty = Paragraph::new("No songs found")
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    // Only build ListItems for the visible window, keeping the selection centered.
    let total = app.library.len();
    let list_height = area.height.saturating_sub(2) as usize;
    let sel = app.selected.min(total - 1);
    let (start, end) = if total <= list_height || list_height == 0 {
        (0, total)
    } else {
        let half = list_height / 2;
        let mut start = sel.saturating_sub(half);
        if start + list_height > total {
            start = total - list_height;
        }
        (start, start + list_height)
    };

    let active_id = snapshot.active_track.as_ref().map(|t| &t.id);
    let items: Vec<ListItem> = app.library.tracks()[start..end]
        .iter()
        .enumerate()
        .map(|(offset, track)| {
            let marker = match (active_id == Some(&track.id), snapshot.is_playing) {
                (true, true) => "▶",
                (true, false) => "‖",
                (false, _) => " ",
            };
            ListItem::new(format!(
                "{marker} {:>3}  {} — {}  [{}]",
                start + offset + 1,
                track.title,
                artist_label(track),
                format_time(track.nominal_duration)
            ))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    state.select(Some(sel - start));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_transport(frame: &mut Frame, app: &App, snapshot: &PlaybackSnapshot, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", transport_label(snapshot.transport)))
        .title_alignment(Alignment::Left);

    let Some(track) = snapshot.active_track.as_ref() else {
        let text = app.toast_text().unwrap_or("Select a song to play");
        let idle = Paragraph::new(text).alignment(Alignment::Center).block(block);
        frame.render_widget(idle, area);
        return;
    };

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(inner);

    let mut info = format!("{} — {}", track.title, artist_label(track));
    if let Some(pos) = snapshot.queue_position() {
        info.push_str(&format!("   [{}/{}]", pos + 1, snapshot.queue.len()));
    }
    info.push_str("   ");
    info.push_str(&volume_text(snapshot.volume));
    if let Some(toast) = app.toast_text() {
        info.push_str("   ");
        info.push_str(toast);
    }
    frame.render_widget(Paragraph::new(info), rows[0]);

    let duration = snapshot.display_duration();
    let gauge = Gauge::default()
        .ratio(progress_ratio(snapshot.position_seconds, duration))
        .label(format!(
            "{} / {}",
            format_time(snapshot.position_seconds),
            format_time(duration)
        ));
    frame.render_widget(gauge, rows[1]);
}
