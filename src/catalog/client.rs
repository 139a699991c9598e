use std::fmt::Display;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

use chrono::{Local, TimeZone};
use reqwest::blocking::Client;
use tracing::{debug, info, warn};

use crate::config::CatalogSettings;

use super::error::CatalogError;
use super::model::{SongsEnvelope, Track};

/// Blocking client for the content API.
///
/// Cheap to clone: the underlying connection pool is shared, so the audio
/// thread reuses it to download track audio.
#[derive(Clone)]
pub struct CatalogClient {
    http: Client,
    songs_url: String,
    assets_url: String,
}

impl CatalogClient {
    pub fn new(settings: &CatalogSettings) -> Result<Self, CatalogError> {
        let songs_url = normalize_url(&settings.songs_url)?;
        let assets_url = normalize_url(&settings.assets_url)?;

        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .user_agent(format!("cadenza/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            songs_url,
            assets_url,
        })
    }

    pub fn songs_url(&self) -> &str {
        &self.songs_url
    }

    /// Fetch and map the whole song list, preserving server order.
    pub fn fetch_tracks(&self) -> Result<Vec<Track>, CatalogError> {
        debug!(url = %self.songs_url, "fetching song list");

        let response = self.http.get(&self.songs_url).send()?;
        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "song list request failed");
            return Err(CatalogError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text()?;
        let tracks = parse_tracks(&body, &self.assets_url, &Local)?;
        info!(count = tracks.len(), "song list loaded");
        Ok(tracks)
    }

    /// Download a complete resource (used for track audio).
    pub fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, CatalogError> {
        debug!(%url, "downloading audio");

        let response = self.http.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
            });
        }

        Ok(response.bytes()?.to_vec())
    }
}

/// Decode a songs response body into view-models.
pub fn parse_tracks<Tz>(
    body: &str,
    assets_url: &str,
    tz: &Tz,
) -> Result<Vec<Track>, CatalogError>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let envelope: SongsEnvelope = serde_json::from_str(body)?;
    Ok(envelope
        .data
        .into_iter()
        .map(|record| Track::from_record(record, assets_url, tz))
        .collect())
}

/// Fetch the catalog on a background thread. The receiver yields exactly one
/// result.
pub fn spawn_load(client: CatalogClient) -> Receiver<Result<Vec<Track>, CatalogError>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(client.fetch_tracks());
    });
    rx
}

pub(super) fn normalize_url(url: &str) -> Result<String, CatalogError> {
    let url = url.trim().trim_end_matches('/');
    if url.is_empty() {
        return Err(CatalogError::InvalidUrl("URL cannot be empty".into()));
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(CatalogError::InvalidUrl(format!(
            "{url}: must start with http:// or https://"
        )));
    }
    Ok(url.to_string())
}
