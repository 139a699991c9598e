use super::*;
use std::sync::mpsc;

fn make_track() -> Track {
    Track {
        id: 4,
        artist: "Test Artist".to_string(),
        name: "Test Title".to_string(),
        cover: "cover-uuid".to_string(),
        thumbnail: "https://assets.example/cover-uuid".to_string(),
        url: "https://audio.example/test.mp3".to_string(),
        date_created: "06:10".to_string(),
        accent: Some("#331E00".to_string()),
        sort: None,
        status: "published".to_string(),
        top_track: true,
        user_created: None,
        user_updated: None,
    }
}

fn handle() -> (MprisHandle, Arc<Mutex<SharedState>>) {
    let state = Arc::new(Mutex::new(SharedState::default()));
    (
        MprisHandle {
            state: state.clone(),
        },
        state,
    )
}

#[test]
fn set_track_metadata_sets_and_clears_shared_state() {
    let (handle, state) = handle();

    let track = make_track();
    handle.set_track_metadata(Some(7), Some(&track), Some(Duration::from_micros(1_234_567)));

    {
        let s = state.lock().unwrap();
        assert_eq!(s.title.as_deref(), Some("Test Title"));
        assert_eq!(s.artist, vec!["Test Artist".to_string()]);
        assert_eq!(s.art_url.as_deref(), Some("https://assets.example/cover-uuid"));
        assert_eq!(s.url.as_deref(), Some("https://audio.example/test.mp3"));
        assert_eq!(s.length_micros, Some(1_234_567));
        assert_eq!(s.track_id.as_deref(), Some("/org/mpris/MediaPlayer2/track/7"));
    }

    handle.set_track_metadata(None, None, None);
    {
        let s = state.lock().unwrap();
        assert_eq!(s.title, None);
        assert!(s.artist.is_empty());
        assert_eq!(s.art_url, None);
        assert_eq!(s.url, None);
        assert_eq!(s.length_micros, None);
        assert!(s.track_id.is_none());
    }
}

#[test]
fn playback_status_maps_state_to_mpris_strings() {
    let (handle, state) = handle();
    let (tx, _rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface {
        tx,
        state: state.clone(),
    };

    assert_eq!(iface.playback_status(), "Stopped");
    handle.set_playback(PlaybackState::Playing);
    assert_eq!(iface.playback_status(), "Playing");
    handle.set_playback(PlaybackState::Paused);
    assert_eq!(iface.playback_status(), "Paused");
}

#[test]
fn metadata_map_contains_published_fields() {
    let (handle, state) = handle();
    handle.set_track_metadata(Some(2), Some(&make_track()), Some(Duration::from_secs(3)));

    let s = state.lock().unwrap();
    let map = metadata_map(&s);
    for key in [
        "mpris:trackid",
        "xesam:title",
        "xesam:artist",
        "mpris:artUrl",
        "xesam:url",
        "mpris:length",
    ] {
        assert!(map.contains_key(key), "missing {key}");
    }
}

#[test]
fn metadata_map_is_empty_without_track() {
    let state = SharedState::default();
    assert!(metadata_map(&state).is_empty());
}

#[test]
fn player_methods_forward_control_commands() {
    let (tx, rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface {
        tx,
        state: Arc::new(Mutex::new(SharedState::default())),
    };

    iface.next();
    iface.previous();
    iface.play_pause();

    assert!(matches!(rx.try_recv(), Ok(ControlCmd::Next)));
    assert!(matches!(rx.try_recv(), Ok(ControlCmd::Prev)));
    assert!(matches!(rx.try_recv(), Ok(ControlCmd::PlayPause)));
}
