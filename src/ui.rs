//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock, time::Duration};

use crate::app::{App, LoadState, PlaybackState};
use crate::audio::{LoopMode, PlaybackInfo};
use crate::config::{ControlsSettings, TimeField, UiSettings};

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("j/k", "up/down");
    map.insert("gg/G", "top/bottom");
    map.insert("enter", "play selected song");
    map.insert("space/p", "play/pause");
    map.insert("h/l", "prev/next song");
    // H/L is filled dynamically from config.
    map.insert("0-9", "seek 0-90%");
    map.insert("m", "mute");
    map.insert("/", "search");
    map.insert("r", "loop mode");
    map.insert("K", "details");
    map.insert("q", "quit");
    map
});

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    // Keep the rendered order stable and human-friendly.
    let order = [
        "j/k", "h/l", "H/L", "enter", "space/p", "0-9", "m", "gg/G", "/", "r", "K", "q",
    ];
    order
        .iter()
        .filter_map(|k| {
            if *k == "H/L" {
                Some(format!("[H/L] scrub -/+{}s", scrub_seconds))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Build the elapsed/total/remaining label per `UiSettings`.
fn time_text(elapsed: Duration, total: Option<Duration>, ui: &UiSettings) -> String {
    let mut parts: Vec<String> = Vec::new();
    for f in &ui.time_fields {
        match f {
            TimeField::Elapsed => parts.push(format_mmss(elapsed)),
            TimeField::Total => parts.push(total.map_or_else(|| "--:--".to_string(), format_mmss)),
            TimeField::Remaining => {
                if let Some(t) = total {
                    parts.push(format!("-{}", format_mmss(t.saturating_sub(elapsed))));
                }
            }
        }
    }
    parts.join(&ui.time_separator)
}

fn loop_text(mode: LoopMode) -> &'static str {
    match mode {
        LoopMode::NoLoop => "No-loop",
        LoopMode::LoopAll => "Loop-around",
        LoopMode::LoopOne => "Repeat-one",
    }
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Window `[start, end)` of `total` rows that keeps `selected_pos` centered
/// when possible.
fn visible_window(total: usize, height: usize, selected_pos: usize) -> (usize, usize) {
    if total <= height || height == 0 {
        return (0, total);
    }
    let half = height / 2;
    let mut start = selected_pos.saturating_sub(half);
    if start + height > total {
        start = total - height;
    }
    (start, start + height)
}

/// Render the entire UI into the provided `frame` using `app` state and settings.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    display: &[usize],
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let bg = app.background;
    let base = Style::default().bg(bg.to_color()).fg(bg.contrast_fg());
    frame.render_widget(Block::default().style(base), frame.area());

    match &app.load_state {
        LoadState::Loading => {
            draw_centered(frame, "Loading...");
            return;
        }
        LoadState::Failed(message) => {
            draw_centered(frame, &format!("Error: {message}"));
            return;
        }
        LoadState::Ready => {}
    }

    let info = app.playback_info();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" cadenza ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, rows[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[1]);

    draw_track_column(frame, app, display, columns[0]);
    draw_player_column(frame, app, &info, ui_settings, columns[1]);

    if app.details_window {
        draw_details(frame, app, columns[0]);
    }

    let footer = Paragraph::new(controls_text(controls_settings.scrub_seconds))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding::left(1)),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, rows[2]);
}

fn draw_centered(frame: &mut Frame, text: &str) {
    let area = frame.area();
    let line_area = Rect {
        x: area.x,
        y: area.y + area.height / 2,
        width: area.width,
        height: area.height.min(1),
    };
    frame.render_widget(
        Paragraph::new(text).alignment(Alignment::Center),
        line_area,
    );
}

fn draw_track_column(frame: &mut Frame, app: &App, display: &[usize], area: Rect) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let search = if app.search_query.is_empty() && !app.search_mode {
        Paragraph::new("Search by song or artist")
            .style(Style::default().add_modifier(Modifier::DIM))
    } else if app.search_mode {
        Paragraph::new(format!("{}_", app.search_query))
    } else {
        Paragraph::new(app.search_query.as_str())
    };
    let search_title = if app.search_mode { " search (esc clears) " } else { " search " };
    frame.render_widget(
        search.block(
            Block::default()
                .borders(Borders::ALL)
                .title(search_title)
                .padding(Padding::left(1)),
        ),
        parts[0],
    );

    let list_area = parts[1];
    let total = display.len();
    // Borders take two rows.
    let list_height = list_area.height.saturating_sub(2) as usize;
    let sel_pos = display.iter().position(|&i| i == app.selected).unwrap_or(0);
    let (start, end) = visible_window(total, list_height, sel_pos);

    // Only build ListItems for the visible window.
    let items: Vec<ListItem> = display[start..end]
        .iter()
        .map(|&i| {
            let track = &app.tracks[i];
            let marker = if app.current == Some(i) { "♪ " } else { "  " };
            let star = if track.top_track { "*" } else { " " };
            ListItem::new(Line::from(vec![
                Span::raw(marker),
                Span::styled(
                    track.name.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!(" · {} ", track.artist)),
                Span::raw(star),
                Span::styled(
                    format!(" {}", track.date_created),
                    Style::default().add_modifier(Modifier::DIM),
                ),
            ]))
        })
        .collect();

    let title = if total == app.tracks.len() {
        format!(" tracks ({}) ", total)
    } else {
        format!(" tracks ({}/{}) ", total, app.tracks.len())
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if total > 0 {
        state.select(Some(sel_pos - start));
    }
    frame.render_stateful_widget(list, list_area, &mut state);
}

fn draw_player_column(
    frame: &mut Frame,
    app: &App,
    info: &PlaybackInfo,
    ui_settings: &UiSettings,
    area: Rect,
) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(4),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(area);

    let now_playing: Vec<Line> = match app.current_track() {
        Some(track) => vec![
            Line::from(Span::styled(
                track.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(track.artist.clone()),
            Line::from(""),
            Line::from(Span::styled(
                track.thumbnail.clone(),
                Style::default().add_modifier(Modifier::DIM),
            )),
        ],
        None => vec![Line::from("Select a song")],
    };
    frame.render_widget(
        Paragraph::new(now_playing)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" now playing ")
                    .padding(Padding::left(1)),
            )
            .wrap(Wrap { trim: true }),
        parts[0],
    );

    if app.current_track().is_none() {
        return;
    }

    let percent = App::progress_percent(info.elapsed, info.duration);
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" progress "))
        .gauge_style(
            Style::default()
                .fg(app.background.contrast_fg())
                .bg(Color::DarkGray),
        )
        .ratio(percent / 100.0)
        .label(time_text(info.elapsed, info.duration, ui_settings));
    frame.render_widget(gauge, parts[1]);

    let mut status: Vec<String> = Vec::new();
    status.push(
        match (app.playback, info.loading) {
            (PlaybackState::Playing, true) => "Loading",
            (PlaybackState::Playing, false) => "Playing",
            (PlaybackState::Paused, _) => "Paused",
            (PlaybackState::Stopped, _) => "Stopped",
        }
        .to_string(),
    );
    status.push(if app.muted { "Muted".into() } else { "Sound on".into() });
    status.push(loop_text(app.loop_mode).to_string());
    if let Some(err) = &info.error {
        status.push(format!("Error: {err}"));
    }

    frame.render_widget(
        Paragraph::new(status.join(" • "))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" status ")
                    .padding(Padding::left(1)),
            )
            .wrap(Wrap { trim: true }),
        parts[2],
    );
}

/// Overlay with every view-model field of the track under the cursor.
fn draw_details(frame: &mut Frame, app: &App, area: Rect) {
    let popup_area = centered_rect_sized(76, 14, area);
    frame.render_widget(Clear, popup_area);

    let text = match app.selected_track() {
        Some(track) => format!(
            "Name: {}\nArtist: {}\nId: {}\nCreated: {}\nAccent: {}\nTop track: {}\nStatus: {}\nSort: {}\nCover: {}\nThumbnail: {}\nAudio: {}\nCreated by: {}\nUpdated by: {}",
            track.name,
            track.artist,
            track.id,
            track.date_created,
            track.accent.as_deref().unwrap_or("-"),
            if track.top_track { "yes" } else { "no" },
            track.status,
            track.sort.map_or_else(|| "-".to_string(), |s| s.to_string()),
            track.cover,
            track.thumbnail,
            track.url,
            track.user_created.as_deref().unwrap_or("-"),
            track.user_updated.as_deref().unwrap_or("-"),
        ),
        None => "No track selected".to_string(),
    };

    let paragraph = Paragraph::new(text)
        .style(Style::default().bg(Color::Black).fg(Color::White))
        .block(
            Block::default()
                .padding(Padding::left(1))
                .borders(Borders::ALL)
                .title(" details (K closes) "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_mmss_pads_minutes_and_seconds() {
        assert_eq!(format_mmss(Duration::from_secs(0)), "00:00");
        assert_eq!(format_mmss(Duration::from_secs(65)), "01:05");
        assert_eq!(format_mmss(Duration::from_millis(599_999)), "09:59");
    }

    #[test]
    fn time_text_follows_configured_fields() {
        let mut ui = UiSettings::default();
        let elapsed = Duration::from_secs(30);
        let total = Some(Duration::from_secs(200));

        assert_eq!(time_text(elapsed, total, &ui), "00:30 / 03:20");
        assert_eq!(time_text(elapsed, None, &ui), "00:30 / --:--");

        ui.time_fields = vec![TimeField::Remaining];
        assert_eq!(time_text(elapsed, total, &ui), "-02:50");
        assert_eq!(time_text(elapsed, None, &ui), "");
    }

    #[test]
    fn controls_text_includes_scrub_seconds() {
        let text = controls_text(7);
        assert!(text.contains("[H/L] scrub -/+7s"));
        assert!(text.contains("[m] mute"));
        assert!(text.starts_with("[j/k] up/down"));
    }

    #[test]
    fn visible_window_centers_selection() {
        assert_eq!(visible_window(5, 10, 3), (0, 5));
        assert_eq!(visible_window(100, 10, 0), (0, 10));
        assert_eq!(visible_window(100, 10, 50), (45, 55));
        assert_eq!(visible_window(100, 10, 99), (90, 100));
        assert_eq!(visible_window(100, 0, 50), (0, 100));
    }
}
