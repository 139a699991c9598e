use std::fmt::Display;

use chrono::TimeZone;
use serde::Deserialize;

use super::time::format_created;

/// Shown in place of a creation time that could not be parsed.
pub const UNKNOWN_TIME: &str = "--:--";

/// Response envelope returned by the songs endpoint.
#[derive(Debug, Deserialize)]
pub struct SongsEnvelope {
    pub data: Vec<SongRecord>,
}

/// A song record as delivered by the content API.
#[derive(Debug, Clone, Deserialize)]
pub struct SongRecord {
    pub id: i64,
    pub status: Option<String>,
    pub sort: Option<i64>,
    pub user_created: Option<String>,
    pub date_created: Option<String>,
    pub user_updated: Option<String>,
    pub name: Option<String>,
    pub artist: Option<String>,
    pub accent: Option<String>,
    pub cover: Option<String>,
    pub top_track: Option<bool>,
    pub url: Option<String>,
}

/// A playable song, normalized for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: i64,
    pub artist: String,
    pub name: String,
    pub cover: String,
    /// `{assets_url}/{cover}`
    pub thumbnail: String,
    pub url: String,
    /// Creation time as `HH:MM`, or `--:--`.
    pub date_created: String,
    pub accent: Option<String>,
    pub sort: Option<i64>,
    pub status: String,
    pub top_track: bool,
    pub user_created: Option<String>,
    pub user_updated: Option<String>,
}

impl Track {
    pub fn from_record<Tz>(record: SongRecord, assets_url: &str, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let cover = record.cover.unwrap_or_default();
        let thumbnail = format!("{}/{}", assets_url.trim_end_matches('/'), cover);
        let date_created = record
            .date_created
            .as_deref()
            .and_then(|raw| format_created(raw, tz))
            .unwrap_or_else(|| UNKNOWN_TIME.to_string());

        Self {
            id: record.id,
            artist: record.artist.unwrap_or_default(),
            name: record.name.unwrap_or_default(),
            cover,
            thumbnail,
            url: record.url.unwrap_or_default(),
            date_created,
            accent: record.accent.filter(|a| !a.trim().is_empty()),
            sort: record.sort,
            status: record.status.unwrap_or_default(),
            top_track: record.top_track.unwrap_or(false),
            user_created: record.user_created,
            user_updated: record.user_updated,
        }
    }
}
