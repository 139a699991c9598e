//! Audio-related small types and handles.
//!
//! This module defines common enums and type aliases used by the
//! audio subsystem (looping mode, commands, playback info and handles).

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::catalog::Track;

use super::error::AudioError;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum LoopMode {
    /// Stop when the current track ends.
    #[default]
    NoLoop,
    /// Advance to the next catalog track, wrapping at the end.
    LoopAll,
    /// Repeat the current track when it ends.
    LoopOne,
}

#[derive(Debug)]
pub enum AudioCmd {
    /// Replace the catalog the player indexes into.
    SetCatalog(Vec<Track>),
    /// Start playing the track at the given catalog index.
    Play(usize),
    /// Stop playback immediately.
    Stop,
    /// Toggle pause/resume.
    TogglePause,
    /// Skip to the next catalog track (wraps).
    Next,
    /// Go to the previous catalog track (wraps).
    Prev,
    /// Jump to an absolute position in the current track.
    SeekTo(Duration),
    /// Seek by the specified number of seconds (positive or negative).
    SeekBy(i32),
    /// Silence output without pausing.
    SetMuted(bool),
    /// Set the end-of-track behavior.
    SetLoopMode(LoopMode),
    /// Quit the audio thread, optionally fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
    /// Sent back by a loader thread once a track download finished.
    Loaded {
        generation: u64,
        index: usize,
        result: Result<LoadedTrack, AudioError>,
    },
}

/// A fully downloaded track, ready to be decoded (repeatedly, for seeking).
#[derive(Clone)]
pub struct LoadedTrack {
    pub bytes: Arc<[u8]>,
    pub duration: Option<Duration>,
}

impl fmt::Debug for LoadedTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedTrack")
            .field("bytes", &self.bytes.len())
            .field("duration", &self.duration)
            .finish()
    }
}

/// Runtime playback information shared with the UI.
#[derive(Debug, Clone, Default)]
pub struct PlaybackInfo {
    /// Catalog index of the current track (if any).
    pub index: Option<usize>,
    /// Elapsed playback time for the current track.
    pub elapsed: Duration,
    /// Total length, once known.
    pub duration: Option<Duration>,
    /// Whether playback is currently active (also true while loading).
    pub playing: bool,
    /// The current track's audio is still downloading.
    pub loading: bool,
    pub muted: bool,
    /// Last load/decode failure, cleared when a new track starts.
    pub error: Option<String>,
}

pub type PlaybackHandle = Arc<Mutex<PlaybackInfo>>;
