//! Application model types: `App`, `PlaybackState` and `Direction`.
//!
//! `App` is the view-state controller. It owns the catalog once loaded, the
//! filter/search inputs, the list cursor, the selected track and the playback
//! flags. It never touches the audio device; the playback driver reads it.

use std::time::Duration;

use crate::catalog::{LoadOutcome, Track, TrackId};

use super::view::{Filter, derive_visible_tracks};

/// The playback state as reported to the outside (status line, MPRIS).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Direction for catalog-wide next/previous.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

impl Direction {
    fn delta(self) -> isize {
        match self {
            Direction::Next => 1,
            Direction::Previous => -1,
        }
    }
}

/// The main application model.
pub struct App {
    pub tracks: Vec<Track>,
    pub loading: bool,

    pub filter: Filter,
    pub search_query: String,
    /// Whether keystrokes currently edit the search query.
    pub search_mode: bool,
    /// Highlighted row, as a position inside `visible_tracks()`.
    pub cursor: usize,

    selected: Option<TrackId>,
    /// Bumped on every explicit selection, including re-selecting the same track.
    selection_epoch: u64,
    pub is_playing: bool,
    /// Percentage of the selected track elapsed, in `[0, 100]`.
    pub progress: f64,
    pub elapsed: Duration,

    pub show_panel: bool,
    pub viewport_width: u16,
    compact_breakpoint: u16,
}

impl App {
    /// Create an empty, loading `App`. `compact_breakpoint` is in terminal columns.
    pub fn new(compact_breakpoint: u16) -> Self {
        Self {
            tracks: Vec::new(),
            loading: true,
            filter: Filter::ForYou,
            search_query: String::new(),
            search_mode: false,
            cursor: 0,
            selected: None,
            selection_epoch: 0,
            is_playing: false,
            progress: 0.0,
            elapsed: Duration::ZERO,
            show_panel: true,
            viewport_width: u16::MAX,
            compact_breakpoint,
        }
    }

    /// Apply the result of the one catalog fetch.
    ///
    /// On success the first track becomes selected; `autoplay` decides whether
    /// it starts playing. On failure the catalog stays empty.
    pub fn finish_loading(&mut self, outcome: LoadOutcome, autoplay: bool) {
        self.loading = false;
        match outcome {
            Ok(tracks) => {
                tracing::info!(count = tracks.len(), "catalog loaded");
                self.tracks = tracks;
                self.selected = self.tracks.first().map(|t| t.id);
                self.selection_epoch += 1;
                self.is_playing = autoplay && self.selected.is_some();
                self.progress = 0.0;
                self.elapsed = Duration::ZERO;
                self.cursor = 0;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load catalog");
                self.tracks.clear();
                self.selected = None;
                self.is_playing = false;
            }
        }
    }

    /// Return true if the catalog contains any tracks.
    pub fn has_tracks(&self) -> bool {
        !self.tracks.is_empty()
    }

    /// Catalog indices currently shown in the track list.
    pub fn visible_tracks(&self) -> Vec<usize> {
        derive_visible_tracks(&self.tracks, self.filter, &self.search_query)
    }

    pub fn selected_id(&self) -> Option<TrackId> {
        self.selected
    }

    pub fn selected_index(&self) -> Option<usize> {
        let id = self.selected?;
        self.tracks.iter().position(|t| t.id == id)
    }

    pub fn selected_track(&self) -> Option<&Track> {
        self.selected_index().map(|i| &self.tracks[i])
    }

    /// The selected track together with the epoch of the selection that chose it.
    ///
    /// Two selections of the same track differ in epoch, so the audio restarts.
    pub fn selection(&self) -> Option<(&Track, u64)> {
        self.selected_track().map(|t| (t, self.selection_epoch))
    }

    pub fn playback_state(&self) -> PlaybackState {
        match (self.selected.is_some(), self.is_playing) {
            (false, _) => PlaybackState::Stopped,
            (true, true) => PlaybackState::Playing,
            (true, false) => PlaybackState::Paused,
        }
    }

    /// Replace the filter. The selected track is left alone.
    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
        self.sync_cursor();
    }

    /// Replace the search query. The selected track is left alone.
    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
        self.sync_cursor();
    }

    pub fn enter_search_mode(&mut self) {
        self.search_mode = true;
    }

    pub fn exit_search_mode(&mut self) {
        self.search_mode = false;
    }

    /// Append a character to the search query and refresh the view.
    pub fn push_search_char(&mut self, c: char) {
        self.search_query.push(c);
        self.sync_cursor();
    }

    /// Remove the last character from the search query and refresh the view.
    pub fn pop_search_char(&mut self) {
        self.search_query.pop();
        self.sync_cursor();
    }

    /// Drop the query and leave search mode.
    pub fn clear_search(&mut self) {
        self.search_mode = false;
        self.set_search_query(String::new());
    }

    /// Select `id`, start playing it from the top.
    ///
    /// On compact viewports the track list collapses so the player is visible.
    pub fn select_track(&mut self, id: TrackId) {
        if !self.tracks.iter().any(|t| t.id == id) {
            tracing::warn!(id, "ignoring selection of unknown track");
            return;
        }
        self.set_current(id);
        if self.is_compact() {
            self.show_panel = false;
        }
    }

    /// Select the track under the cursor, if the visible list has one.
    pub fn select_under_cursor(&mut self) {
        let visible = self.visible_tracks();
        if let Some(&i) = visible.get(self.cursor) {
            let id = self.tracks[i].id;
            self.select_track(id);
        }
    }

    /// Flip the playing flag. Nothing to play until a track is selected.
    pub fn toggle_playback(&mut self) {
        if self.selected.is_none() {
            return;
        }
        self.is_playing = !self.is_playing;
    }

    pub fn play(&mut self) {
        if self.selected.is_some() {
            self.is_playing = true;
        }
    }

    pub fn pause(&mut self) {
        self.is_playing = false;
    }

    /// Move the selection one step through the full catalog, wrapping around.
    ///
    /// Filter and search are ignored. No-op on an empty catalog or when nothing
    /// is selected.
    pub fn advance(&mut self, direction: Direction) {
        let len = self.tracks.len();
        if len == 0 {
            return;
        }
        let Some(index) = self.selected_index() else {
            return;
        };

        let len = len as isize;
        let next = ((index as isize + direction.delta() + len) % len) as usize;
        let id = self.tracks[next].id;
        self.set_current(id);
    }

    /// Show or hide the track-list panel. Only visible in compact layouts.
    pub fn toggle_panel(&mut self) {
        self.show_panel = !self.show_panel;
    }

    pub fn set_viewport_width(&mut self, cols: u16) {
        self.viewport_width = cols;
    }

    pub fn is_compact(&self) -> bool {
        self.viewport_width < self.compact_breakpoint
    }

    pub fn panel_visible(&self) -> bool {
        self.show_panel || !self.is_compact()
    }

    /// Record the latest progress percentage reported for the selected track.
    pub fn set_progress(&mut self, percent: f64) {
        if self.selected.is_none() || !percent.is_finite() {
            return;
        }
        self.progress = percent.clamp(0.0, 100.0);
    }

    pub fn set_elapsed(&mut self, elapsed: Duration) {
        if self.selected.is_some() {
            self.elapsed = elapsed;
        }
    }

    /// The media handle failed for the current track: stay selected, stop playing.
    pub fn pause_after_failure(&mut self) {
        self.is_playing = false;
    }

    /// Move the cursor down one row, wrapping to the top.
    pub fn cursor_down(&mut self) {
        let len = self.visible_tracks().len();
        if len > 0 {
            self.cursor = (self.cursor + 1) % len;
        }
    }

    /// Move the cursor up one row, wrapping to the bottom.
    pub fn cursor_up(&mut self) {
        let len = self.visible_tracks().len();
        if len > 0 {
            self.cursor = (self.cursor + len - 1) % len;
        }
    }

    pub fn cursor_top(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_bottom(&mut self) {
        self.cursor = self.visible_tracks().len().saturating_sub(1);
    }

    fn set_current(&mut self, id: TrackId) {
        self.selected = Some(id);
        self.selection_epoch += 1;
        self.is_playing = true;
        self.progress = 0.0;
        self.elapsed = Duration::ZERO;
        self.sync_cursor();
    }

    /// Keep the cursor on the selected track when it is visible, otherwise
    /// clamp it into the visible list.
    fn sync_cursor(&mut self) {
        let visible = self.visible_tracks();
        if visible.is_empty() {
            self.cursor = 0;
            return;
        }

        if let Some(sel) = self.selected_index() {
            if let Some(pos) = visible.iter().position(|&i| i == sel) {
                self.cursor = pos;
                return;
            }
        }
        self.cursor = self.cursor.min(visible.len() - 1);
    }
}
