use super::client::{CatalogClient, normalize_url, parse_tracks};
use super::error::CatalogError;
use super::model::{SongRecord, Track, UNKNOWN_TIME};
use super::time::format_created;
use crate::config::CatalogSettings;
use chrono::{FixedOffset, Utc};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BODY: &str = r##"{
  "data": [
    {
      "id": 1,
      "status": "published",
      "sort": null,
      "user_created": "2085be13-8079-40a6-8a39-c3b9180f9a0a",
      "date_created": "2023-08-10T06:10:57.194Z",
      "user_updated": "2085be13-8079-40a6-8a39-c3b9180f9a0a",
      "date_updated": "2023-08-10T07:19:48.547Z",
      "name": "Colors",
      "artist": "William King",
      "accent": "#331E00",
      "cover": "4f718272-6b0e-42ee-92d0-805b783cb471",
      "top_track": true,
      "url": "https://pub-172b4845a7e24a16956308706aaf24c2.r2.dev/august-145937.mp3"
    },
    {
      "id": 2,
      "status": "published",
      "name": "Saudade",
      "artist": "Gonzalo Mendes",
      "cover": "bd1c5ee6-8c2c-4f4b-9b9f-b0a0e5a0f111",
      "date_created": "2023-08-10T23:59:00",
      "url": "https://example.com/saudade.mp3"
    }
  ]
}"##;

#[test]
fn parse_tracks_maps_every_field_in_order() {
    let tracks = parse_tracks(BODY, "https://cms.samespace.com/assets", &Utc).unwrap();
    assert_eq!(tracks.len(), 2);

    let colors = &tracks[0];
    assert_eq!(colors.id, 1);
    assert_eq!(colors.name, "Colors");
    assert_eq!(colors.artist, "William King");
    assert_eq!(colors.accent.as_deref(), Some("#331E00"));
    assert_eq!(
        colors.thumbnail,
        "https://cms.samespace.com/assets/4f718272-6b0e-42ee-92d0-805b783cb471"
    );
    assert_eq!(colors.date_created, "06:10");
    assert_eq!(colors.status, "published");
    assert_eq!(colors.sort, None);
    assert!(colors.top_track);
    assert_eq!(
        colors.user_created.as_deref(),
        Some("2085be13-8079-40a6-8a39-c3b9180f9a0a")
    );
    assert!(colors.url.ends_with("august-145937.mp3"));

    let saudade = &tracks[1];
    assert_eq!(saudade.id, 2);
    assert_eq!(saudade.accent, None);
    assert!(!saudade.top_track);
    assert_eq!(saudade.date_created, "23:59");
    assert_eq!(saudade.user_updated, None);
}

#[test]
fn parse_tracks_rejects_unexpected_shape() {
    let err = parse_tracks(r#"{"items": []}"#, "https://a", &Utc).unwrap_err();
    assert!(matches!(err, CatalogError::Parse(_)));
}

#[test]
fn parse_tracks_accepts_empty_list() {
    let tracks = parse_tracks(r#"{"data": []}"#, "https://a", &Utc).unwrap();
    assert!(tracks.is_empty());
}

#[test]
fn format_created_converts_to_the_requested_zone() {
    let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
    assert_eq!(
        format_created("2023-08-10T06:10:57.194Z", &ist).as_deref(),
        Some("11:40")
    );
    assert_eq!(
        format_created("2023-08-10T23:45:00Z", &ist).as_deref(),
        Some("05:15")
    );
}

#[test]
fn format_created_handles_offsets_and_naive_input() {
    assert_eq!(
        format_created("2023-08-10T06:10:57+02:00", &Utc).as_deref(),
        Some("04:10")
    );
    assert_eq!(
        format_created("2023-08-10T06:10:57", &Utc).as_deref(),
        Some("06:10")
    );
    assert_eq!(format_created("yesterday", &Utc), None);
}

#[test]
fn unparseable_creation_time_uses_placeholder() {
    let record = SongRecord {
        id: 9,
        status: None,
        sort: Some(3),
        user_created: None,
        date_created: Some("not a date".into()),
        user_updated: None,
        name: Some("Name".into()),
        artist: Some("Artist".into()),
        accent: Some("   ".into()),
        cover: None,
        top_track: None,
        url: None,
    };
    let track = Track::from_record(record, "https://assets.example/", &Utc);
    assert_eq!(track.date_created, UNKNOWN_TIME);
    assert_eq!(track.accent, None);
    assert_eq!(track.thumbnail, "https://assets.example/");
    assert_eq!(track.sort, Some(3));
}

#[test]
fn normalize_url_trims_and_validates() {
    assert_eq!(
        normalize_url(" https://cms.samespace.com/items/songs/ ").unwrap(),
        "https://cms.samespace.com/items/songs"
    );
    assert!(normalize_url("").is_err());
    assert!(normalize_url("ftp://host/songs").is_err());
    assert!(normalize_url("cms.samespace.com").is_err());
}

fn settings_for(server: &MockServer) -> CatalogSettings {
    CatalogSettings {
        songs_url: format!("{}/items/songs", server.uri()),
        assets_url: format!("{}/assets/", server.uri()),
        timeout_secs: 5,
        connect_timeout_secs: 5,
    }
}

// The blocking client must not run on the async executor.
async fn fetch_tracks_from(settings: CatalogSettings) -> Result<Vec<Track>, CatalogError> {
    tokio::task::spawn_blocking(move || CatalogClient::new(&settings)?.fetch_tracks())
        .await
        .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn fetch_tracks_reads_song_list_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/items/songs"))
        .respond_with(ResponseTemplate::new(200).set_body_string(BODY))
        .expect(1)
        .mount(&server)
        .await;

    let tracks = fetch_tracks_from(settings_for(&server)).await.unwrap();

    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].name, "Colors");
    assert_eq!(tracks[1].name, "Saudade");
    assert_eq!(
        tracks[0].thumbnail,
        format!("{}/assets/4f718272-6b0e-42ee-92d0-805b783cb471", server.uri())
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn fetch_tracks_reports_non_success_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/items/songs"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = fetch_tracks_from(settings_for(&server)).await.unwrap_err();

    assert!(matches!(err, CatalogError::Status { status: 503 }));
    assert!(err.to_string().starts_with("Failed to fetch data"));
}

#[tokio::test(flavor = "multi_thread")]
async fn fetch_tracks_rejects_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/items/songs"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = fetch_tracks_from(settings_for(&server)).await.unwrap_err();
    assert!(matches!(err, CatalogError::Parse(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn fetch_bytes_returns_body_and_checks_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/audio/ok.mp3"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3, 4]))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/audio/missing.mp3"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let settings = settings_for(&server);
    let base = server.uri();
    let (ok, missing) = tokio::task::spawn_blocking(move || {
        let client = CatalogClient::new(&settings).unwrap();
        (
            client.fetch_bytes(&format!("{base}/audio/ok.mp3")),
            client.fetch_bytes(&format!("{base}/audio/missing.mp3")),
        )
    })
    .await
    .unwrap();

    assert_eq!(ok.unwrap(), vec![1, 2, 3, 4]);
    assert!(matches!(missing, Err(CatalogError::Status { status: 404 })));
}
