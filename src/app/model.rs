//! Application model types: `App`, `LoadState` and `PlaybackState`.
//!
//! The `App` struct holds the fetched catalog, the cursor, the track chosen
//! for playback, the search query and the derived background theme used by
//! the UI and runtime.

use std::time::Duration;

use crate::audio::{LoopMode, PlaybackHandle, PlaybackInfo};
use crate::catalog::Track;
use crate::theme::{self, Rgb};

/// Where the one-shot catalog fetch stands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    Failed(String),
}

/// The playback state of the application.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// The main application model.
pub struct App {
    pub tracks: Vec<Track>,
    pub load_state: LoadState,

    /// Cursor position (catalog index).
    pub selected: usize,
    /// Track chosen for playback (catalog index).
    pub current: Option<usize>,
    pub playback: PlaybackState,
    pub playback_handle: Option<PlaybackHandle>,
    /// Index the audio thread reported on the last sync.
    engine_index: Option<usize>,

    pub follow_playback: bool,
    pub loop_mode: LoopMode,
    pub muted: bool,

    pub search_mode: bool,
    pub search_query: String,

    pub background: Rgb,
    fallback_accent: Rgb,

    pub details_window: bool,
}

impl App {
    /// Create an empty `App` waiting for the catalog.
    pub fn new(default_background: Rgb, fallback_accent: Rgb) -> Self {
        Self {
            tracks: Vec::new(),
            load_state: LoadState::Loading,
            selected: 0,
            current: None,
            playback: PlaybackState::Stopped,
            playback_handle: None,
            engine_index: None,
            follow_playback: true,
            loop_mode: LoopMode::NoLoop,
            muted: false,
            search_mode: false,
            search_query: String::new(),
            background: default_background,
            fallback_accent,
            details_window: false,
        }
    }

    /// Install the fetched catalog.
    pub fn set_tracks(&mut self, tracks: Vec<Track>) {
        self.tracks = tracks;
        self.load_state = LoadState::Ready;
        self.selected = 0;
        self.current = None;
        self.ensure_selected_visible();
    }

    pub fn set_load_error(&mut self, message: String) {
        self.load_state = LoadState::Failed(message);
    }

    /// Attach a `PlaybackHandle` used to observe playback progress.
    pub fn set_playback_handle(&mut self, h: PlaybackHandle) {
        self.playback_handle = Some(h);
    }

    /// Snapshot of the audio thread's shared state.
    pub fn playback_info(&self) -> PlaybackInfo {
        self.playback_handle
            .as_ref()
            .and_then(|h| h.lock().ok().map(|info| info.clone()))
            .unwrap_or_default()
    }

    /// Return true if the catalog contains any tracks.
    pub fn has_tracks(&self) -> bool {
        !self.tracks.is_empty()
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current.and_then(|i| self.tracks.get(i))
    }

    pub fn selected_track(&self) -> Option<&Track> {
        self.tracks.get(self.selected)
    }

    /// Case-insensitive substring match on the song name or the artist.
    /// An empty query matches every track.
    pub fn matches_query(track: &Track, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let query = query.to_lowercase();
        track.name.to_lowercase().contains(&query) || track.artist.to_lowercase().contains(&query)
    }

    /// Catalog indices matching the search query, in catalog order.
    pub fn display_indices(&self) -> Vec<usize> {
        self.tracks
            .iter()
            .enumerate()
            .filter(|(_, t)| Self::matches_query(t, &self.search_query))
            .map(|(i, _)| i)
            .collect()
    }

    /// Make the track with identifier `id` current and theme the screen with
    /// its accent. Returns its catalog index, `None` for an unknown id.
    pub fn show_song(&mut self, id: i64) -> Option<usize> {
        let index = self.tracks.iter().position(|t| t.id == id)?;
        let track = &self.tracks[index];
        self.background = theme::background_for(track.accent.as_deref(), self.fallback_accent);
        self.selected = index;
        self.current = Some(index);
        Some(index)
    }

    /// Record the current track. The background only changes through
    /// `show_song`.
    pub fn set_current(&mut self, index: Option<usize>) {
        self.current = index;
    }

    /// Track after the current one over the whole catalog, wrapping.
    pub fn next_index(&self) -> Option<usize> {
        let i = self.current?;
        let n = self.tracks.len();
        (n > 0).then(|| (i + 1) % n)
    }

    /// Track before the current one over the whole catalog, wrapping.
    pub fn prev_index(&self) -> Option<usize> {
        let i = self.current?;
        let n = self.tracks.len();
        (n > 0).then(|| (i + n - 1) % n)
    }

    /// Fold the audio thread's view of playback into the model.
    pub fn sync_playback(&mut self, info: &PlaybackInfo) {
        self.playback = if info.playing {
            PlaybackState::Playing
        } else if info.index.is_some() {
            PlaybackState::Paused
        } else {
            PlaybackState::Stopped
        };

        // The engine dropped its track (stop, catalog reset): follow it.
        if info.index.is_none() && self.engine_index.is_some() {
            self.current = None;
        }
        self.engine_index = info.index;

        if let Some(idx) = info.index {
            self.set_current(Some(idx));
            if self.follow_playback
                && !self.search_mode
                && self.selected != idx
                && self.display_indices().contains(&idx)
            {
                self.selected = idx;
            }
        }
    }

    /// Playback position as a percentage of the total length, `0.0` when the
    /// length is unknown.
    pub fn progress_percent(elapsed: Duration, total: Option<Duration>) -> f64 {
        match total {
            Some(total) if !total.is_zero() => {
                (elapsed.as_secs_f64() / total.as_secs_f64() * 100.0).clamp(0.0, 100.0)
            }
            _ => 0.0,
        }
    }

    /// Position for a percentage of the total length.
    pub fn seek_target(percent: f64, total: Option<Duration>) -> Option<Duration> {
        let total = total?;
        let percent = if percent.is_nan() {
            0.0
        } else {
            percent.clamp(0.0, 100.0)
        };
        Some(total.mul_f64(percent / 100.0))
    }

    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    /// Cycle `loop_mode` through `NoLoop -> LoopAll -> LoopOne`.
    pub fn cycle_loop_mode(&mut self) {
        self.loop_mode = match self.loop_mode {
            LoopMode::NoLoop => LoopMode::LoopAll,
            LoopMode::LoopAll => LoopMode::LoopOne,
            LoopMode::LoopOne => LoopMode::NoLoop,
        };
    }

    pub fn toggle_details(&mut self) {
        self.details_window = !self.details_window;
    }

    /// Enable following playback (cursor follows currently playing track).
    pub fn follow_playback_on(&mut self) {
        self.follow_playback = true;
    }

    pub fn follow_playback_off(&mut self) {
        self.follow_playback = false;
    }

    /// Set the selected track index and ensure it is visible in the display.
    pub fn set_selected(&mut self, idx: usize) {
        self.selected = idx;
        self.ensure_selected_visible();
    }

    /// Move selection to the first visible track.
    pub fn select_first(&mut self) {
        if let Some(&first) = self.display_indices().first() {
            self.selected = first;
        }
    }

    /// Move selection to the last visible track.
    pub fn select_last(&mut self) {
        if let Some(&last) = self.display_indices().last() {
            self.selected = last;
        }
    }

    /// Return the next visible index after `current`, wrapping around.
    pub fn next_in_view_from(&self, current: usize) -> Option<usize> {
        let display = self.display_indices();
        if display.is_empty() {
            return None;
        }

        let pos = display.iter().position(|&i| i == current);
        match pos {
            Some(p) => Some(display[(p + 1) % display.len()]),
            None => Some(display[0]),
        }
    }

    /// Return the previous visible index before `current`, wrapping around.
    pub fn prev_in_view_from(&self, current: usize) -> Option<usize> {
        let display = self.display_indices();
        if display.is_empty() {
            return None;
        }

        let pos = display.iter().position(|&i| i == current);
        match pos {
            Some(0) => Some(display[display.len() - 1]),
            Some(p) => Some(display[p - 1]),
            None => Some(display[display.len() - 1]),
        }
    }

    /// Move selection to the next visible track.
    pub fn next(&mut self) {
        if let Some(next) = self.next_in_view_from(self.selected) {
            self.selected = next;
        }
    }

    /// Move selection to the previous visible track.
    pub fn prev(&mut self) {
        if let Some(prev) = self.prev_in_view_from(self.selected) {
            self.selected = prev;
        }
    }

    /// Focus the search input.
    pub fn enter_search_mode(&mut self) {
        self.search_mode = true;
        self.follow_playback_off();
        self.ensure_selected_visible();
    }

    /// Leave the search input, keeping the query.
    pub fn exit_search_mode(&mut self) {
        self.search_mode = false;
    }

    /// Drop the query and leave the search input.
    pub fn clear_search(&mut self) {
        self.search_query.clear();
        self.search_mode = false;
        self.ensure_selected_visible();
    }

    pub fn push_search_char(&mut self, c: char) {
        self.search_query.push(c);
        self.ensure_selected_visible();
    }

    pub fn pop_search_char(&mut self) {
        self.search_query.pop();
        self.ensure_selected_visible();
    }

    /// Keep `selected` inside the filtered view, otherwise move it to the
    /// first visible track.
    fn ensure_selected_visible(&mut self) {
        let display = self.display_indices();
        if display.is_empty() {
            self.selected = 0;
            return;
        }

        if !display.contains(&self.selected) {
            self.selected = display[0];
        }
    }
}
