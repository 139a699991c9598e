//! Downloading track audio off the audio thread.

use std::io::Cursor;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use lofty::prelude::*;
use lofty::probe::Probe;
use tracing::debug;

use crate::catalog::{CatalogClient, Track};

use super::error::AudioError;
use super::types::{AudioCmd, LoadedTrack};

/// Download `track` on a worker thread and report back through `tx`.
pub(super) fn spawn_load(
    client: CatalogClient,
    track: Track,
    index: usize,
    generation: u64,
    tx: Sender<AudioCmd>,
) {
    thread::spawn(move || {
        let result = load_track(&client, &track);
        let _ = tx.send(AudioCmd::Loaded {
            generation,
            index,
            result,
        });
    });
}

pub(super) fn load_track(client: &CatalogClient, track: &Track) -> Result<LoadedTrack, AudioError> {
    if track.url.trim().is_empty() {
        return Err(AudioError::MissingUrl(track.id));
    }

    let bytes: Arc<[u8]> = client.fetch_bytes(&track.url)?.into();
    let duration = probe_duration(&bytes);
    debug!(id = track.id, len = bytes.len(), ?duration, "track audio downloaded");

    Ok(LoadedTrack { bytes, duration })
}

/// Read the total length from container/stream headers. `None` when the
/// format is unknown or reports no length.
pub(crate) fn probe_duration(bytes: &[u8]) -> Option<Duration> {
    let tagged = Probe::new(Cursor::new(bytes))
        .guess_file_type()
        .ok()?
        .read()
        .ok()?;
    let duration = tagged.properties().duration();
    (!duration.is_zero()).then_some(duration)
}
