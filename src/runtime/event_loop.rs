use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, Direction, Filter, PlaybackState};
use crate::catalog::{CatalogError, LoadOutcome, TrackId};
use crate::config;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::playback::{AudioPlayer, DriverUpdate, PlaybackDriver};
use crate::runtime::mpris_sync::update_mpris;
use crate::ui;

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
    /// Last-known selected track as emitted to MPRIS.
    pub last_mpris_track: Option<TrackId>,
    /// Last-known playback state as emitted to MPRIS.
    pub last_mpris_playback: PlaybackState,
}

impl EventLoopState {
    /// Construct a new `EventLoopState` seeded from `app`.
    pub fn new(app: &App) -> Self {
        Self {
            pending_gg: false,
            last_mpris_track: app.selected_id(),
            last_mpris_playback: app.playback_state(),
        }
    }
}

/// Main terminal event loop: handles input, UI drawing, catalog arrival,
/// playback sync and MPRIS. Returns `Ok(())` when shutdown is requested.
#[allow(clippy::too_many_arguments)]
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    driver: &mut PlaybackDriver<AudioPlayer>,
    loader: &Receiver<LoadOutcome>,
    mpris: &MprisHandle,
    control_rx: &Receiver<ControlCmd>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        if app.loading {
            match loader.try_recv() {
                Ok(outcome) => app.finish_loading(outcome, settings.playback.autoplay_first),
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    app.finish_loading(Err(CatalogError::LoaderGone), false)
                }
            }
        }

        // Reconcile the media handle with the current selection and flag.
        driver.sync(app.selection(), app.is_playing);

        loop {
            let Some(event) = driver.media().try_event() else {
                break;
            };
            if let Some(update) = driver.accept(event) {
                apply_update(app, update);
            }
        }
        // A failure or end of track may have flipped the flag; settle it now.
        driver.sync(app.selection(), app.is_playing);

        let playback = app.playback_state();
        if app.selected_id() != state.last_mpris_track || playback != state.last_mpris_playback {
            update_mpris(mpris, app, &settings.catalog.assets_url);
            state.last_mpris_track = app.selected_id();
            state.last_mpris_playback = playback;
        }

        terminal.draw(|f| ui::draw(f, app, settings))?;

        while let Ok(cmd) = control_rx.try_recv() {
            if handle_control_cmd(cmd, app) {
                return Ok(());
            }
        }

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if handle_key_event(key, app, state) {
                        break;
                    }
                }
                Event::Resize(cols, _) => app.set_viewport_width(cols),
                _ => {}
            }
        }
    }

    Ok(())
}

fn apply_update(app: &mut App, update: DriverUpdate) {
    match update {
        DriverUpdate::Progress { elapsed, percent } => {
            app.set_elapsed(elapsed);
            if let Some(p) = percent {
                app.set_progress(p);
            }
        }
        DriverUpdate::Ended => {
            app.set_progress(100.0);
            app.pause();
        }
        DriverUpdate::Failed(message) => {
            let track = app.selected_track().map(|t| t.display());
            tracing::error!(?track, %message, "playback failed, pausing");
            app.pause_after_failure();
        }
    }
}

/// Apply a remote (MPRIS) command. Returns true when shutdown is requested.
fn handle_control_cmd(cmd: ControlCmd, app: &mut App) -> bool {
    tracing::debug!(?cmd, "remote control");
    match cmd {
        ControlCmd::Quit => return true,
        ControlCmd::Play => app.play(),
        // There is no separate stopped state once a track is bound.
        ControlCmd::Pause | ControlCmd::Stop => app.pause(),
        ControlCmd::PlayPause => app.toggle_playback(),
        ControlCmd::Next => app.advance(Direction::Next),
        ControlCmd::Prev => app.advance(Direction::Previous),
    }
    false
}

/// Apply a key press. Returns true when shutdown is requested.
fn handle_key_event(key: KeyEvent, app: &mut App, state: &mut EventLoopState) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('c') {
        return true;
    }

    if app.search_mode {
        state.pending_gg = false;
        match key.code {
            KeyCode::Esc => app.clear_search(),
            KeyCode::Enter => app.exit_search_mode(),
            KeyCode::Backspace => app.pop_search_char(),
            KeyCode::Down => app.cursor_down(),
            KeyCode::Up => app.cursor_up(),
            KeyCode::Char('j') | KeyCode::Char('n') if ctrl => app.cursor_down(),
            KeyCode::Char('k') | KeyCode::Char('p') if ctrl => app.cursor_up(),
            KeyCode::Char(c) => {
                if !c.is_control() {
                    app.push_search_char(c);
                }
            }
            _ => {}
        }
        return false;
    }

    if key.code != KeyCode::Char('g') {
        state.pending_gg = false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('/') => app.enter_search_mode(),
        KeyCode::Esc => {
            if !app.search_query.is_empty() {
                app.clear_search();
            }
        }
        KeyCode::Char('j') | KeyCode::Down => app.cursor_down(),
        KeyCode::Char('k') | KeyCode::Up => app.cursor_up(),
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                app.cursor_top();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => app.cursor_bottom(),
        KeyCode::Enter => app.select_under_cursor(),
        KeyCode::Char(' ') | KeyCode::Char('p') => app.toggle_playback(),
        KeyCode::Char('l') | KeyCode::Char('n') => app.advance(Direction::Next),
        KeyCode::Char('h') | KeyCode::Char('b') => app.advance(Direction::Previous),
        KeyCode::Char('1') => app.set_filter(Filter::ForYou),
        KeyCode::Char('2') => app.set_filter(Filter::TopTracks),
        KeyCode::Tab => app.set_filter(app.filter.toggled()),
        KeyCode::Char('m') | KeyCode::Char('L') => app.toggle_panel(),
        _ => {}
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Track;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_with(n: u64) -> App {
        let tracks = (1..=n)
            .map(|id| Track {
                id,
                name: format!("Song {id}"),
                artist: if id % 2 == 0 { "Mark".into() } else { "Jane".into() },
                cover: None,
                url: format!("https://example.invalid/{id}.mp3"),
                duration: None,
                top_track: id % 2 == 0,
                accent: None,
            })
            .collect();
        let mut app = App::new(100);
        app.set_viewport_width(120);
        app.finish_loading(Ok(tracks), false);
        app
    }

    #[test]
    fn quit_keys_request_shutdown() {
        let mut app = app_with(2);
        let mut state = EventLoopState::new(&app);
        assert!(handle_key_event(key(KeyCode::Char('q')), &mut app, &mut state));
        assert!(handle_key_event(
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            &mut app,
            &mut state
        ));
    }

    #[test]
    fn enter_plays_highlighted_row() {
        let mut app = app_with(3);
        let mut state = EventLoopState::new(&app);
        handle_key_event(key(KeyCode::Char('j')), &mut app, &mut state);
        handle_key_event(key(KeyCode::Enter), &mut app, &mut state);
        assert_eq!(app.selected_id(), Some(2));
        assert!(app.is_playing);
    }

    #[test]
    fn search_mode_captures_typing() {
        let mut app = app_with(3);
        let mut state = EventLoopState::new(&app);
        handle_key_event(key(KeyCode::Char('/')), &mut app, &mut state);
        for c in "mar".chars() {
            handle_key_event(key(KeyCode::Char(c)), &mut app, &mut state);
        }
        assert_eq!(app.search_query, "mar");
        assert_eq!(app.visible_tracks(), vec![1]);
        // 'q' is text while searching.
        assert!(!handle_key_event(key(KeyCode::Char('q')), &mut app, &mut state));
        assert_eq!(app.search_query, "marq");

        handle_key_event(key(KeyCode::Esc), &mut app, &mut state);
        assert!(!app.search_mode);
        assert!(app.search_query.is_empty());
    }

    #[test]
    fn gg_needs_two_presses() {
        let mut app = app_with(3);
        let mut state = EventLoopState::new(&app);
        handle_key_event(key(KeyCode::Char('G')), &mut app, &mut state);
        assert_eq!(app.cursor, 2);
        handle_key_event(key(KeyCode::Char('g')), &mut app, &mut state);
        assert_eq!(app.cursor, 2);
        handle_key_event(key(KeyCode::Char('g')), &mut app, &mut state);
        assert_eq!(app.cursor, 0);
    }

    #[test]
    fn transport_keys_drive_controller() {
        let mut app = app_with(3);
        let mut state = EventLoopState::new(&app);
        handle_key_event(key(KeyCode::Char(' ')), &mut app, &mut state);
        assert!(app.is_playing);
        handle_key_event(key(KeyCode::Char('h')), &mut app, &mut state);
        assert_eq!(app.selected_id(), Some(3));
        handle_key_event(key(KeyCode::Char('l')), &mut app, &mut state);
        assert_eq!(app.selected_id(), Some(1));
        handle_key_event(key(KeyCode::Tab), &mut app, &mut state);
        assert_eq!(app.filter, Filter::TopTracks);
        handle_key_event(key(KeyCode::Char('1')), &mut app, &mut state);
        assert_eq!(app.filter, Filter::ForYou);
    }

    #[test]
    fn menu_and_playlist_keys_share_one_toggle() {
        let mut app = app_with(1);
        let mut state = EventLoopState::new(&app);
        handle_key_event(key(KeyCode::Char('m')), &mut app, &mut state);
        assert!(!app.show_panel);
        handle_key_event(key(KeyCode::Char('L')), &mut app, &mut state);
        assert!(app.show_panel);
    }

    #[test]
    fn remote_commands_map_to_controller_operations() {
        let mut app = app_with(2);
        assert!(!handle_control_cmd(ControlCmd::Play, &mut app));
        assert!(app.is_playing);
        handle_control_cmd(ControlCmd::Stop, &mut app);
        assert!(!app.is_playing);
        handle_control_cmd(ControlCmd::PlayPause, &mut app);
        assert!(app.is_playing);
        handle_control_cmd(ControlCmd::Next, &mut app);
        assert_eq!(app.selected_id(), Some(2));
        handle_control_cmd(ControlCmd::Prev, &mut app);
        assert_eq!(app.selected_id(), Some(1));
        assert!(handle_control_cmd(ControlCmd::Quit, &mut app));
    }

    #[test]
    fn failure_update_pauses_and_end_fills_progress() {
        let mut app = app_with(2);
        app.select_track(1);
        apply_update(&mut app, DriverUpdate::Failed("unreachable".into()));
        assert!(!app.is_playing);
        assert_eq!(app.selected_id(), Some(1));

        app.play();
        apply_update(
            &mut app,
            DriverUpdate::Progress {
                elapsed: Duration::from_secs(10),
                percent: Some(12.5),
            },
        );
        assert_eq!(app.progress, 12.5);
        assert_eq!(app.elapsed, Duration::from_secs(10));

        apply_update(&mut app, DriverUpdate::Ended);
        assert_eq!(app.progress, 100.0);
        assert!(!app.is_playing);
    }
}
