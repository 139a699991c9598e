use crate::app::App;
use crate::mpris::MprisHandle;

pub fn update_mpris(mpris: &MprisHandle, app: &App) {
    let info = app.playback_info();
    let track = info.index.and_then(|i| app.tracks.get(i));
    mpris.set_track_metadata(info.index, track, info.duration);
    mpris.set_playback(app.playback);
}
