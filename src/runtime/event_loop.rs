use std::sync::mpsc::{self, TryRecvError};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{debug, error, info};

use crate::app::{App, LoadState, PlaybackState};
use crate::audio::{AudioCmd, AudioPlayer};
use crate::catalog::{CatalogError, Track};
use crate::config;
use crate::mpris::ControlCmd;
use crate::mpris::MprisHandle;
use crate::runtime::mpris_sync::update_mpris;
use crate::ui;

type CatalogReceiver = mpsc::Receiver<Result<Vec<Track>, CatalogError>>;

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
    /// Last-known playing index as emitted to MPRIS.
    pub last_mpris_index: Option<usize>,
    /// Last-known playback state as emitted to MPRIS.
    pub last_mpris_playback: PlaybackState,
    last_mpris_duration: Option<Duration>,
    /// Pending catalog fetch; dropped once it resolves.
    catalog_rx: Option<CatalogReceiver>,
}

impl EventLoopState {
    /// Construct a new `EventLoopState` seeded from `app`.
    pub fn new(app: &App, catalog_rx: CatalogReceiver) -> Self {
        Self {
            pending_gg: false,
            last_mpris_index: None,
            last_mpris_playback: app.playback,
            last_mpris_duration: None,
            catalog_rx: Some(catalog_rx),
        }
    }
}

/// Main terminal event loop: handles input, UI drawing, sync with the audio
/// thread and MPRIS. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    audio_player: &AudioPlayer,
    mpris: &MprisHandle,
    control_tx: &mpsc::Sender<ControlCmd>,
    control_rx: &mpsc::Receiver<ControlCmd>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        poll_catalog(app, audio_player, state);

        let info = app.playback_info();
        app.sync_playback(&info);

        // Keep MPRIS in sync even when playback changes come from media keys or auto-advance.
        if info.index != state.last_mpris_index
            || app.playback != state.last_mpris_playback
            || info.duration != state.last_mpris_duration
        {
            update_mpris(mpris, app);
            state.last_mpris_index = info.index;
            state.last_mpris_playback = app.playback;
            state.last_mpris_duration = info.duration;
        }

        let display = app.display_indices();
        terminal.draw(|f| ui::draw(f, app, &display, &settings.ui, &settings.controls))?;

        while let Ok(cmd) = control_rx.try_recv() {
            if handle_control_cmd(cmd, settings, app, audio_player, mpris)? {
                return Ok(());
            }
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, audio_player, mpris, control_tx, state)? {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Install the catalog once the background fetch reports back.
fn poll_catalog(app: &mut App, audio_player: &AudioPlayer, state: &mut EventLoopState) {
    let Some(rx) = state.catalog_rx.as_ref() else {
        return;
    };

    match rx.try_recv() {
        Ok(Ok(tracks)) => {
            info!(count = tracks.len(), "catalog ready");
            let _ = audio_player.send(AudioCmd::SetCatalog(tracks.clone()));
            app.set_tracks(tracks);
            state.catalog_rx = None;
        }
        Ok(Err(e)) => {
            error!(error = %e, "catalog fetch failed");
            app.set_load_error(e.to_string());
            state.catalog_rx = None;
        }
        Err(TryRecvError::Empty) => {}
        Err(TryRecvError::Disconnected) => {
            error!("catalog loader exited without a result");
            app.set_load_error("Catalog loader stopped unexpectedly".to_string());
            state.catalog_rx = None;
        }
    }
}

/// Start the track under the cursor, theming the screen with its accent.
fn play_selected(app: &mut App, audio_player: &AudioPlayer, mpris: &MprisHandle) {
    let Some(id) = app.selected_track().map(|t| t.id) else {
        return;
    };
    if let Some(i) = app.show_song(id) {
        debug!(index = i, id, "play selected");
        let _ = audio_player.send(AudioCmd::Play(i));
        app.playback = PlaybackState::Playing;
        update_mpris(mpris, app);
    }
}

fn skip(app: &mut App, audio_player: &AudioPlayer, mpris: &MprisHandle, forward: bool) {
    let target = if forward {
        app.next_index()
    } else {
        app.prev_index()
    };
    // Nothing current: nothing to skip from.
    if target.is_none() {
        return;
    }
    if !app.search_mode {
        app.follow_playback_on();
    }
    app.set_current(target);
    let _ = audio_player.send(if forward { AudioCmd::Next } else { AudioCmd::Prev });
    app.playback = PlaybackState::Playing;
    update_mpris(mpris, app);
}

fn handle_control_cmd(
    cmd: ControlCmd,
    settings: &config::Settings,
    app: &mut App,
    audio_player: &AudioPlayer,
    mpris: &MprisHandle,
) -> Result<bool, Box<dyn std::error::Error>> {
    if app.load_state != LoadState::Ready && !matches!(cmd, ControlCmd::Quit) {
        return Ok(false);
    }

    match cmd {
        ControlCmd::Quit => {
            audio_player.quit_softly(Duration::from_millis(settings.audio.quit_fade_out_ms));
            return Ok(true);
        }
        ControlCmd::Play => match app.playback {
            PlaybackState::Paused => {
                let _ = audio_player.send(AudioCmd::TogglePause);
                app.playback = PlaybackState::Playing;
                update_mpris(mpris, app);
            }
            PlaybackState::Stopped => play_selected(app, audio_player, mpris),
            PlaybackState::Playing => {}
        },
        ControlCmd::Pause => {
            if app.playback == PlaybackState::Playing {
                let _ = audio_player.send(AudioCmd::TogglePause);
                app.playback = PlaybackState::Paused;
                update_mpris(mpris, app);
            }
        }
        ControlCmd::PlayPause => match app.playback {
            PlaybackState::Stopped => play_selected(app, audio_player, mpris),
            PlaybackState::Playing => {
                let _ = audio_player.send(AudioCmd::TogglePause);
                app.playback = PlaybackState::Paused;
                update_mpris(mpris, app);
            }
            PlaybackState::Paused => {
                let _ = audio_player.send(AudioCmd::TogglePause);
                app.playback = PlaybackState::Playing;
                update_mpris(mpris, app);
            }
        },
        ControlCmd::Stop => {
            let _ = audio_player.send(AudioCmd::Stop);
            app.playback = PlaybackState::Stopped;
            update_mpris(mpris, app);
        }
        ControlCmd::Next => skip(app, audio_player, mpris, true),
        ControlCmd::Prev => skip(app, audio_player, mpris, false),
    }

    Ok(false)
}

fn handle_search_key(
    key: KeyEvent,
    app: &mut App,
    audio_player: &AudioPlayer,
    mpris: &MprisHandle,
) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => app.clear_search(),
        KeyCode::Backspace => app.pop_search_char(),
        KeyCode::Char('j') | KeyCode::Char('n') if ctrl => app.next(),
        KeyCode::Char('k') | KeyCode::Char('p') if ctrl => app.prev(),
        KeyCode::Down => app.next(),
        KeyCode::Up => app.prev(),
        KeyCode::Char(c) => {
            if !c.is_control() && !ctrl {
                app.push_search_char(c);
            }
        }
        KeyCode::Enter => {
            if app.display_indices().is_empty() {
                return;
            }
            app.exit_search_mode();
            app.follow_playback_on();
            play_selected(app, audio_player, mpris);
        }
        _ => {}
    }
}

fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    audio_player: &AudioPlayer,
    mpris: &MprisHandle,
    control_tx: &mpsc::Sender<ControlCmd>,
    state: &mut EventLoopState,
) -> Result<bool, Box<dyn std::error::Error>> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        audio_player.quit_softly(Duration::from_millis(settings.audio.quit_fade_out_ms));
        return Ok(true);
    }

    // Only quitting makes sense until the catalog is in.
    if app.load_state != LoadState::Ready {
        if key.code == KeyCode::Char('q') {
            audio_player.quit_softly(Duration::from_millis(settings.audio.quit_fade_out_ms));
            return Ok(true);
        }
        return Ok(false);
    }

    if app.search_mode {
        state.pending_gg = false;
        handle_search_key(key, app, audio_player, mpris);
        return Ok(false);
    }

    if key.code != KeyCode::Char('g') {
        state.pending_gg = false;
    }

    match key.code {
        KeyCode::Char('q') => {
            audio_player.quit_softly(Duration::from_millis(settings.audio.quit_fade_out_ms));
            return Ok(true);
        }
        KeyCode::Char('/') => app.enter_search_mode(),
        KeyCode::Esc => {
            if app.details_window {
                app.toggle_details();
            } else if !app.search_query.is_empty() {
                app.clear_search();
            }
        }
        KeyCode::Char('r') => {
            app.cycle_loop_mode();
            let _ = audio_player.send(AudioCmd::SetLoopMode(app.loop_mode));
        }
        KeyCode::Char('m') => {
            app.toggle_mute();
            let _ = audio_player.send(AudioCmd::SetMuted(app.muted));
        }
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
        KeyCode::Enter => {
            let info = app.playback_info();
            let is_playing_selected =
                app.playback == PlaybackState::Playing && info.index == Some(app.selected);
            if !is_playing_selected {
                app.follow_playback_on();
                play_selected(app, audio_player, mpris);
            }
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            let _ = control_tx.send(ControlCmd::PlayPause);
        }
        KeyCode::Char('l') | KeyCode::Right => {
            let _ = control_tx.send(ControlCmd::Next);
        }
        KeyCode::Char('h') | KeyCode::Left => {
            let _ = control_tx.send(ControlCmd::Prev);
        }
        KeyCode::Char('L') => {
            let secs = settings.controls.scrub_seconds.min(i32::MAX as u64) as i32;
            let _ = audio_player.send(AudioCmd::SeekBy(secs));
        }
        KeyCode::Char('H') => {
            let secs = settings.controls.scrub_seconds.min(i32::MAX as u64) as i32;
            let _ = audio_player.send(AudioCmd::SeekBy(-secs));
        }
        KeyCode::Char(c @ '0'..='9') => {
            let percent = f64::from(c.to_digit(10).unwrap_or(0) * 10);
            if let Some(target) = App::seek_target(percent, app.playback_info().duration) {
                let _ = audio_player.send(AudioCmd::SeekTo(target));
            }
        }
        KeyCode::Char('K') => app.toggle_details(),
        _ => {}
    }

    Ok(false)
}
