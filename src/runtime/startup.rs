use crate::app::App;
use crate::audio::{AudioCmd, AudioPlayer, LoopMode};
use crate::config;

pub fn apply_playback_defaults(
    app: &mut App,
    audio_player: &AudioPlayer,
    settings: &config::Settings,
) {
    app.loop_mode = match settings.playback.loop_mode {
        config::LoopModeSetting::NoLoop => LoopMode::NoLoop,
        config::LoopModeSetting::LoopAll => LoopMode::LoopAll,
        config::LoopModeSetting::LoopOne => LoopMode::LoopOne,
    };
    app.muted = settings.playback.start_muted;

    let _ = audio_player.send(AudioCmd::SetLoopMode(app.loop_mode));
    let _ = audio_player.send(AudioCmd::SetMuted(app.muted));
}
