use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use rodio::OutputStreamBuilder;
use tracing::{debug, error, info, warn};

use crate::catalog::{CatalogClient, Track};
use crate::config::AudioSettings;

use super::error::AudioError;
use super::queue::{EndAction, end_of_track, next_index, prev_index};
use super::sink::{Backend, RodioBackend, Voice};
use super::types::{AudioCmd, LoadedTrack, LoopMode, PlaybackHandle, PlaybackInfo};

const TICK: Duration = Duration::from_millis(200);

pub(super) fn spawn_audio_thread(
    client: CatalogClient,
    rx: Receiver<AudioCmd>,
    tx: Sender<AudioCmd>,
    playback_info: PlaybackHandle,
    audio_settings: AudioSettings,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(stream) => stream,
            Err(e) => {
                let e = AudioError::from(e);
                error!(error = %e, "audio thread exiting");
                if let Ok(mut info) = playback_info.lock() {
                    info.error = Some(e.to_string());
                }
                return;
            }
        };
        // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
        // but noisy for a TUI app.
        stream.log_on_drop(false);

        let backend = RodioBackend::new(stream, client, tx);
        let mut engine = Engine::new(backend, playback_info, audio_settings);
        let mut last_tick = Instant::now();

        loop {
            match rx.recv_timeout(TICK) {
                Ok(AudioCmd::Quit { fade_out_ms }) => {
                    engine.quit(fade_out_ms);
                    break;
                }
                Ok(cmd) => engine.handle(cmd),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            // Periodic elapsed publishing and auto-advance.
            if last_tick.elapsed() >= TICK {
                engine.tick();
                last_tick = Instant::now();
            }
        }
    })
}

/// State owned by the audio thread.
pub(super) struct Engine<B: Backend> {
    backend: B,
    playback_info: PlaybackHandle,
    settings: AudioSettings,

    tracks: Vec<Track>,
    sink: Option<B::Voice>,
    loaded: Option<LoadedTrack>,
    index: Option<usize>,
    loading: bool,
    paused: bool,

    // Track start time and accumulated elapsed when paused.
    started_at: Option<Instant>,
    accumulated: Duration,

    muted: bool,
    loop_mode: LoopMode,
    /// Bumped on every play/stop so stale downloads are dropped.
    generation: u64,
}

impl<B: Backend> Engine<B> {
    pub(super) fn new(backend: B, playback_info: PlaybackHandle, settings: AudioSettings) -> Self {
        Self {
            backend,
            playback_info,
            settings,
            tracks: Vec::new(),
            sink: None,
            loaded: None,
            index: None,
            loading: false,
            paused: true,
            started_at: None,
            accumulated: Duration::ZERO,
            muted: false,
            loop_mode: LoopMode::default(),
            generation: 0,
        }
    }

    pub(super) fn handle(&mut self, cmd: AudioCmd) {
        match cmd {
            AudioCmd::SetCatalog(tracks) => {
                debug!(count = tracks.len(), "catalog received");
                self.stop();
                self.tracks = tracks;
            }
            AudioCmd::Play(i) => self.play(i),
            AudioCmd::Stop => self.stop(),
            AudioCmd::TogglePause => self.toggle_pause(),
            AudioCmd::Next => {
                if let Some(i) = next_index(self.index, self.tracks.len()) {
                    self.play(i);
                }
            }
            AudioCmd::Prev => {
                if let Some(i) = prev_index(self.index, self.tracks.len()) {
                    self.play(i);
                }
            }
            AudioCmd::SeekTo(target) => self.seek_to(target),
            AudioCmd::SeekBy(secs) => {
                let cur = self.elapsed().as_millis() as i64;
                let new = (cur + secs as i64 * 1000).max(0) as u64;
                self.seek_to(Duration::from_millis(new));
            }
            AudioCmd::SetMuted(muted) => self.set_muted(muted),
            AudioCmd::SetLoopMode(mode) => self.loop_mode = mode,
            AudioCmd::Quit { fade_out_ms } => self.quit(fade_out_ms),
            AudioCmd::Loaded {
                generation,
                index,
                result,
            } => self.on_loaded(generation, index, result),
        }
    }

    fn volume(&self) -> f32 {
        if self.muted { 0.0 } else { 1.0 }
    }

    fn duration(&self) -> Option<Duration> {
        self.loaded.as_ref().and_then(|l| l.duration)
    }

    fn elapsed(&self) -> Duration {
        let elapsed = self.accumulated + self.started_at.map_or(Duration::ZERO, |st| st.elapsed());
        match self.duration() {
            Some(total) => elapsed.min(total),
            None => elapsed,
        }
    }

    fn update_info(&self, f: impl FnOnce(&mut PlaybackInfo)) {
        if let Ok(mut info) = self.playback_info.lock() {
            f(&mut info);
        }
    }

    fn play(&mut self, i: usize) {
        let Some(track) = self.tracks.get(i).cloned() else {
            warn!(index = i, len = self.tracks.len(), "play: index out of range");
            return;
        };

        // The previous sink keeps playing until the new audio arrives.
        self.generation += 1;
        self.index = Some(i);
        self.loaded = None;
        self.loading = true;
        self.paused = false;
        self.started_at = None;
        self.accumulated = Duration::ZERO;

        info!(id = track.id, name = %track.name, artist = %track.artist, "loading track");
        self.update_info(|info| {
            info.index = Some(i);
            info.elapsed = Duration::ZERO;
            info.duration = None;
            info.playing = true;
            info.loading = true;
            info.error = None;
        });

        self.backend.fetch(track, i, self.generation);
    }

    fn on_loaded(
        &mut self,
        generation: u64,
        index: usize,
        result: Result<LoadedTrack, AudioError>,
    ) {
        if generation != self.generation || self.index != Some(index) {
            debug!(generation, index, "discarding stale track load");
            return;
        }
        self.loading = false;

        let mut loaded = match result {
            Ok(loaded) => loaded,
            Err(e) => return self.fail(e),
        };
        if loaded.duration.is_none() {
            loaded.duration = self.backend.decoded_duration(&loaded.bytes);
        }

        let new_sink = match self.backend.open(&loaded.bytes, Duration::ZERO) {
            Ok(sink) => sink,
            Err(e) => return self.fail(e),
        };
        // The new voice is audible from the first crossfade step.
        let started = Instant::now();
        self.swap_sink(new_sink);

        let duration = loaded.duration;
        self.loaded = Some(loaded);
        self.accumulated = Duration::ZERO;
        self.started_at = if self.paused { None } else { Some(started) };

        let playing = !self.paused;
        self.update_info(|info| {
            info.loading = false;
            info.duration = duration;
            info.elapsed = Duration::ZERO;
            info.playing = playing;
        });
    }

    /// Replace the current sink, crossfading when the old one is audible.
    fn swap_sink(&mut self, new_sink: B::Voice) {
        let volume = self.volume();
        let crossfade_ms = self.settings.crossfade_ms;
        let crossfade_steps = self.settings.crossfade_steps.max(1);

        if let Some(old_sink) = self.sink.take() {
            let audible = !old_sink.is_paused() && !old_sink.empty() && volume > 0.0;
            if audible && crossfade_ms > 0 && !self.paused {
                old_sink.set_volume(volume);
                new_sink.set_volume(0.0);
                new_sink.play();

                // Fade volumes in a short blocking loop. Audio continues in
                // rodio's mixer thread.
                for step in 1..=crossfade_steps {
                    let t = (step as f32) / (crossfade_steps as f32);
                    old_sink.set_volume(volume * (1.0 - t));
                    new_sink.set_volume(volume * t);
                    thread::sleep(Duration::from_millis(
                        (crossfade_ms / crossfade_steps).max(1),
                    ));
                }
            }
            old_sink.stop();
        }

        new_sink.set_volume(volume);
        if self.paused {
            new_sink.pause();
        } else {
            new_sink.play();
        }
        self.sink = Some(new_sink);
    }

    fn fail(&mut self, e: AudioError) {
        let name = self
            .index
            .and_then(|i| self.tracks.get(i))
            .map(|t| t.name.clone())
            .unwrap_or_default();
        warn!(track = %name, error = %e, "playback failed");

        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.loaded = None;
        self.loading = false;
        self.paused = true;
        self.started_at = None;
        self.accumulated = Duration::ZERO;

        let message = e.to_string();
        self.update_info(|info| {
            info.playing = false;
            info.loading = false;
            info.elapsed = Duration::ZERO;
            info.duration = None;
            info.error = Some(message);
        });
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.generation += 1;
        self.index = None;
        self.loaded = None;
        self.loading = false;
        self.paused = true;
        self.started_at = None;
        self.accumulated = Duration::ZERO;
        self.update_info(|info| {
            info.index = None;
            info.elapsed = Duration::ZERO;
            info.duration = None;
            info.playing = false;
            info.loading = false;
        });
    }

    /// The track ran out with nothing queued after it.
    fn finish(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.accumulated = self.duration().unwrap_or_else(|| self.elapsed());
        self.started_at = None;
        self.paused = true;

        let elapsed = self.accumulated;
        self.update_info(|info| {
            info.playing = false;
            info.elapsed = elapsed;
        });
    }

    fn toggle_pause(&mut self) {
        let Some(i) = self.index else {
            return;
        };

        if self.loading {
            // Remember the intent; applied when the audio arrives. The
            // previous track may still be sounding until then.
            self.paused = !self.paused;
            if let Some(sink) = self.sink.as_ref() {
                if self.paused {
                    sink.pause();
                } else {
                    sink.play();
                }
            }
            let playing = !self.paused;
            self.update_info(|info| info.playing = playing);
            return;
        }

        if self.loaded.is_none() {
            // Previous attempt failed: try again.
            self.play(i);
            return;
        }

        match self.sink.as_ref() {
            Some(sink) => {
                if self.paused {
                    sink.play();
                    self.started_at = Some(Instant::now());
                } else {
                    sink.pause();
                    if let Some(st) = self.started_at {
                        self.accumulated += st.elapsed();
                    }
                    self.started_at = None;
                }
                self.paused = !self.paused;
                let playing = !self.paused;
                self.update_info(|info| info.playing = playing);
            }
            None => {
                // Finished track: play it again from the top.
                self.paused = false;
                self.seek_to(Duration::ZERO);
            }
        }
    }

    /// Scrubbing: rebuild the sink from the in-memory audio and skip into it.
    fn seek_to(&mut self, target: Duration) {
        let Some(loaded) = self.loaded.as_ref() else {
            return;
        };
        let target = match loaded.duration {
            Some(total) => target.min(total),
            None => target,
        };
        let bytes = loaded.bytes.clone();

        if let Some(sink) = self.sink.take() {
            sink.stop();
        }

        let new_sink = match self.backend.open(&bytes, target) {
            Ok(sink) => sink,
            Err(e) => return self.fail(e),
        };
        new_sink.set_volume(self.volume());
        if self.paused {
            self.started_at = None;
        } else {
            new_sink.play();
            self.started_at = Some(Instant::now());
        }

        self.sink = Some(new_sink);
        self.accumulated = target;

        let playing = !self.paused;
        self.update_info(|info| {
            info.elapsed = target;
            info.playing = playing;
        });
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if let Some(sink) = self.sink.as_ref() {
            sink.set_volume(self.volume());
        }
        self.update_info(|info| info.muted = muted);
    }

    pub(super) fn tick(&mut self) {
        if self.loaded.is_some() {
            let elapsed = self.elapsed();
            self.update_info(|info| info.elapsed = elapsed);
        }

        let finished =
            !self.paused && !self.loading && self.sink.as_ref().is_some_and(|s| s.empty());
        if !finished {
            return;
        }
        let Some(current) = self.index else {
            return;
        };

        match end_of_track(self.loop_mode, current, self.tracks.len()) {
            EndAction::Stop => self.finish(),
            EndAction::Restart => self.seek_to(Duration::ZERO),
            EndAction::Play(i) => self.play(i),
        }
    }

    fn quit(&mut self, fade_out_ms: u64) {
        if let Some(sink) = self.sink.take() {
            if !self.paused {
                // Fade out gently before stopping.
                fade_out_sink(&sink, self.volume(), fade_out_ms);
            }
            sink.stop();
        }
        // Update shared state so UI/MPRIS don't keep showing Playing.
        self.update_info(|info| info.playing = false);
    }
}

fn fade_out_sink(sink: &impl Voice, from: f32, fade_out_ms: u64) {
    if fade_out_ms == 0 || from == 0.0 {
        sink.set_volume(0.0);
        return;
    }
    let steps: u64 = 20;
    let step_ms = (fade_out_ms / steps).max(1);
    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        sink.set_volume(from * (1.0 - t));
        thread::sleep(Duration::from_millis(step_ms));
    }
    sink.set_volume(0.0);
}
