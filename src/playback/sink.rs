//! Utilities for turning a remote audio URL into a `rodio` sink.
//!
//! The whole body is downloaded once and kept in memory so the sink can be
//! rebuilt (replay after the end) without fetching again.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use rodio::decoder::DecoderError;
use rodio::{Decoder, OutputStream, Sink, Source};

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("no audio output device: {0}")]
    NoOutputDevice(String),
    #[error("failed to fetch audio: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("audio source returned status {0}")]
    Status(StatusCode),
    #[error("failed to decode audio: {0}")]
    Decode(#[from] DecoderError),
    #[error("no track is loaded")]
    NotLoaded,
}

/// Downloaded audio, cheap to clone into a new decoder.
#[derive(Clone)]
pub(super) struct AudioBytes(Arc<[u8]>);

impl From<&[u8]> for AudioBytes {
    fn from(bytes: &[u8]) -> Self {
        AudioBytes(Arc::from(bytes))
    }
}

impl AsRef<[u8]> for AudioBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Download the full audio body behind `url`.
pub(super) fn fetch_audio(
    client: &reqwest::blocking::Client,
    url: &str,
) -> Result<AudioBytes, MediaError> {
    let response = client.get(url).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(MediaError::Status(status));
    }
    let body = response.bytes()?;
    tracing::debug!(url, bytes = body.len(), "audio downloaded");
    Ok(AudioBytes::from(body.as_ref()))
}

/// Create a paused `Sink` playing `bytes` from the start.
///
/// Returns the decoder's total duration when the container reports one.
pub(super) fn create_sink(
    stream: &OutputStream,
    bytes: &AudioBytes,
) -> Result<(Sink, Option<Duration>), MediaError> {
    let source = Decoder::new(Cursor::new(bytes.clone()))?;
    let total = source.total_duration();

    let sink = Sink::connect_new(stream.mixer());
    sink.append(source);
    sink.pause();
    Ok((sink, total))
}
