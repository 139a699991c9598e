use thiserror::Error;

use crate::catalog::CatalogError;

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("audio download failed: {0}")]
    Fetch(#[from] CatalogError),

    #[error("cannot decode audio: {0}")]
    Decode(#[from] rodio::decoder::DecoderError),

    #[error("no audio output device: {0}")]
    Output(#[from] rodio::StreamError),

    #[error("track {0} has no audio URL")]
    MissingUrl(i64),
}
