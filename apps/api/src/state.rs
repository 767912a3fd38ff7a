use std::sync::Arc;

use crate::config::Config;
use crate::interview::transcription::Transcriber;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    pub config: Config,
    /// Speech-to-text backend. Default: `UnconfiguredTranscriber`.
    pub transcriber: Arc<dyn Transcriber>,
}
