//! Catalog navigation used by the audio thread.
//!
//! Next/previous always walk the whole catalog with wrap-around, independent
//! of any search filter applied in the UI.

use super::types::LoopMode;

/// What the player does when the current track runs out.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum EndAction {
    Stop,
    Restart,
    Play(usize),
}

/// Index after `current`, wrapping. `None` with nothing current.
pub(crate) fn next_index(current: Option<usize>, len: usize) -> Option<usize> {
    let i = current?;
    (len > 0).then(|| (i + 1) % len)
}

/// Index before `current`, wrapping. `None` with nothing current.
pub(crate) fn prev_index(current: Option<usize>, len: usize) -> Option<usize> {
    let i = current?;
    (len > 0).then(|| (i % len + len - 1) % len)
}

pub(crate) fn end_of_track(loop_mode: LoopMode, current: usize, len: usize) -> EndAction {
    match loop_mode {
        LoopMode::NoLoop => EndAction::Stop,
        LoopMode::LoopOne => EndAction::Restart,
        LoopMode::LoopAll => match next_index(Some(current), len) {
            Some(i) if i == current => EndAction::Restart,
            Some(i) => EndAction::Play(i),
            None => EndAction::Stop,
        },
    }
}
