use std::sync::mpsc;

use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::App;
use crate::audio::AudioPlayer;
use crate::catalog::{self, CatalogClient};
use crate::logging;
use crate::mpris::ControlCmd;
use crate::theme::{self, DEFAULT_BACKGROUND, FALLBACK_ACCENT};

mod event_loop;
mod mpris_sync;
mod settings;
mod startup;

pub use settings::load_settings;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, settings_problem) = load_settings();

    // Held until exit so buffered log lines get flushed.
    let _log_guard = logging::init(&settings.logging);
    if let Some(msg) = settings_problem {
        warn!("{msg}");
    }

    let client = CatalogClient::new(&settings.catalog)?;
    info!(url = client.songs_url(), "fetching catalog");
    let catalog_rx = catalog::spawn_load(client.clone());

    let audio_player = AudioPlayer::new(client, settings.audio.clone());
    let mut app = App::new(
        theme::parse_hex(&settings.ui.default_background).unwrap_or(DEFAULT_BACKGROUND),
        theme::parse_hex(&settings.ui.fallback_accent).unwrap_or(FALLBACK_ACCENT),
    );

    app.follow_playback = settings.ui.follow_playback;
    app.set_playback_handle(audio_player.playback_handle());

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx.clone());

    mpris_sync::update_mpris(&mpris, &app);

    startup::apply_playback_defaults(&mut app, &audio_player, &settings);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState::new(&app, catalog_rx);

        event_loop::run(
            &mut terminal,
            &settings,
            &mut app,
            &audio_player,
            &mpris,
            &control_tx,
            &control_rx,
            &mut state,
        )
    })();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("shutting down");
    run_result
}
