//! Upstream adapter trait definitions.
//!
//! One trait per external capability. Uses RPITIT so implementations can be
//! written with plain `async fn`; `box_provider` supplies the object-safe
//! wrappers the service holds.

use std::future::Future;

use parley_types::error::UpstreamError;
use parley_types::upstream::{AudioUpload, ChatRequest};

/// Speech-to-text backend.
///
/// Implementations live in parley-infra (e.g., `OpenAiTranscriber`).
pub trait Transcriber: Send + Sync {
    /// Human-readable backend name (e.g., "openai").
    fn name(&self) -> &str;

    /// Transcribe recorded audio into text.
    fn transcribe(
        &self,
        audio: &AudioUpload,
    ) -> impl Future<Output = Result<String, UpstreamError>> + Send;
}

/// Chat-completion backend returning a single reply.
pub trait ChatCompleter: Send + Sync {
    fn name(&self) -> &str;

    /// Send the message list and return the model's reply text.
    fn complete(
        &self,
        request: &ChatRequest,
    ) -> impl Future<Output = Result<String, UpstreamError>> + Send;
}

/// Text-to-speech backend.
pub trait SpeechSynthesizer: Send + Sync {
    fn name(&self) -> &str;

    /// Synthesize `text` and return the encoded audio bytes.
    fn synthesize(&self, text: &str)
    -> impl Future<Output = Result<Vec<u8>, UpstreamError>> + Send;
}
