//! Speech-to-text seam.
//!
//! The concrete vendor client lives outside this service. `AppState` carries an
//! `Arc<dyn Transcriber>`; the default reports itself unconfigured, and answer
//! submission carries on with whatever text was typed.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranscriptionError {
    #[error("no transcription backend is configured")]
    Unconfigured,
}

/// Turns a stored audio recording into text.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// `audio_locator` is whatever the storage layer uses to find the file
    /// (path, object key, URL).
    async fn transcribe(&self, audio_locator: &str) -> Result<String, TranscriptionError>;
}

pub struct UnconfiguredTranscriber;

#[async_trait]
impl Transcriber for UnconfiguredTranscriber {
    async fn transcribe(&self, _audio_locator: &str) -> Result<String, TranscriptionError> {
        Err(TranscriptionError::Unconfigured)
    }
}
