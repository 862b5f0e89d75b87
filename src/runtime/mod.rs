use std::env;
use std::io::Stdout;
use std::sync::mpsc;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::catalog::spawn_loader;
use crate::mpris::ControlCmd;
use crate::playback::{AudioPlayer, PlaybackDriver};

mod event_loop;
mod logging;
mod mpris_sync;
mod settings;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (mut settings, config_warning) = settings::load_settings();

    // An explicit endpoint on the command line wins over config.
    if let Some(url) = env::args().nth(1) {
        settings.catalog.url = url;
    }

    // Like config, logging is optional: without a log file the player still runs.
    match logging::init(&settings.log) {
        Ok(path) => eprintln!("spindle: logging to {}", path.display()),
        Err(e) => eprintln!("spindle: logging disabled: {e}"),
    }
    if let Some(warning) = config_warning {
        tracing::warn!("{warning}");
    }
    tracing::info!(catalog = %settings.catalog.url, "starting");

    let loader = spawn_loader(settings.catalog.clone());
    let player = AudioPlayer::new(
        Duration::from_millis(settings.playback.time_update_ms),
        Duration::from_secs(settings.playback.download_timeout_secs),
    );
    let mut driver = PlaybackDriver::new(player);

    let mut app = App::new(settings.ui.compact_breakpoint);
    if let Ok((cols, _)) = crossterm::terminal::size() {
        app.set_viewport_width(cols);
    }

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx);

    mpris_sync::update_mpris(&mpris, &app, &settings.catalog.assets_url);

    let mut terminal = setup_terminal()?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState::new(&app);

        event_loop::run(
            &mut terminal,
            &settings,
            &mut app,
            &mut driver,
            &loader,
            &mpris,
            &control_rx,
            &mut state,
        )
    })();

    // Give the terminal back first: the audio thread may still be mid-download.
    let restored = restore_terminal(&mut terminal);

    tracing::debug!("waiting for audio thread");
    driver.media().quit();

    if let Err(e) = &run_result {
        tracing::error!(error = %e, "event loop failed");
    }
    tracing::info!("shutting down");
    run_result?;
    restored?;
    Ok(())
}

/// Enter raw mode and the alternate screen, undoing raw mode if the rest fails.
fn setup_terminal() -> std::io::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = std::io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(e);
    }

    match Terminal::new(CrosstermBackend::new(stdout)) {
        Ok(terminal) => Ok(terminal),
        Err(e) => {
            let _ = execute!(std::io::stdout(), LeaveAlternateScreen);
            let _ = disable_raw_mode();
            Err(e)
        }
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> std::io::Result<()> {
    let raw = disable_raw_mode();
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    raw
}
