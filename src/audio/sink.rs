//! Audio output used by the engine.
//!
//! The engine drives a `Backend`: it opens voices from downloaded bytes and
//! starts downloads. `RodioBackend` is the real one, backed by an
//! `OutputStream` and `CatalogClient`.

use std::io::Cursor;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};

use crate::catalog::{CatalogClient, Track};

use super::error::AudioError;
use super::source::spawn_load;
use super::types::AudioCmd;

/// One playing (or paused) track.
pub(super) trait Voice {
    fn play(&self);
    fn pause(&self);
    fn stop(&self);
    fn set_volume(&self, volume: f32);
    fn is_paused(&self) -> bool;
    /// Nothing left to play.
    fn empty(&self) -> bool;
}

pub(super) trait Backend {
    type Voice: Voice;

    /// Create a paused voice for `bytes` that starts playback at `start_at`.
    fn open(&self, bytes: &Arc<[u8]>, start_at: Duration) -> Result<Self::Voice, AudioError>;

    /// Length reported by the decoder, used when header probing found none.
    fn decoded_duration(&self, bytes: &Arc<[u8]>) -> Option<Duration>;

    /// Start downloading `track`; the result comes back as `AudioCmd::Loaded`.
    fn fetch(&self, track: Track, index: usize, generation: u64);
}

impl Voice for Sink {
    fn play(&self) {
        Sink::play(self);
    }

    fn pause(&self) {
        Sink::pause(self);
    }

    fn stop(&self) {
        Sink::stop(self);
    }

    fn set_volume(&self, volume: f32) {
        Sink::set_volume(self, volume);
    }

    fn is_paused(&self) -> bool {
        Sink::is_paused(self)
    }

    fn empty(&self) -> bool {
        Sink::empty(self)
    }
}

pub(super) struct RodioBackend {
    stream: OutputStream,
    client: CatalogClient,
    /// Loader threads report back through this.
    tx: Sender<AudioCmd>,
}

impl RodioBackend {
    pub(super) fn new(stream: OutputStream, client: CatalogClient, tx: Sender<AudioCmd>) -> Self {
        Self { stream, client, tx }
    }
}

impl Backend for RodioBackend {
    type Voice = Sink;

    fn open(&self, bytes: &Arc<[u8]>, start_at: Duration) -> Result<Sink, AudioError> {
        let source = Decoder::new(Cursor::new(bytes.clone()))?
            // `skip_duration` is our seeking primitive; even Duration::ZERO is fine.
            .skip_duration(start_at);

        let sink = Sink::connect_new(self.stream.mixer());
        sink.append(source);
        sink.pause();
        Ok(sink)
    }

    fn decoded_duration(&self, bytes: &Arc<[u8]>) -> Option<Duration> {
        Decoder::new(Cursor::new(bytes.clone()))
            .ok()?
            .total_duration()
    }

    fn fetch(&self, track: Track, index: usize, generation: u64) {
        spawn_load(
            self.client.clone(),
            track,
            index,
            generation,
            self.tx.clone(),
        );
    }
}
