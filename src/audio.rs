//! Playback engine.
//!
//! A dedicated thread owns the audio output and a single `rodio` sink. The UI
//! sends `AudioCmd`s over a channel and observes progress through the shared
//! `PlaybackInfo`. Track audio is downloaded on short-lived loader threads so
//! commands stay responsive while a song is fetched.

mod error;
mod player;
mod queue;
mod sink;
mod source;
mod thread;
mod types;

pub use player::AudioPlayer;
pub use types::{AudioCmd, LoopMode, PlaybackHandle, PlaybackInfo};
