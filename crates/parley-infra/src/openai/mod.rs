//! OpenAI-compatible upstream adapters.
//!
//! One adapter per capability, all sharing an [`OpenAiConnection`]: the HTTP
//! client, the bearer key and the base URL. Non-success responses are
//! returned as [`UpstreamError::Status`] carrying the raw body so callers can
//! pass it through unchanged.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and only exposed when
//! building the `Authorization` header.

pub mod chat;
pub mod speech;
pub mod transcription;
pub mod types;

#[cfg(test)]
pub(crate) mod stub;

use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use parley_core::upstream::box_provider::{BoxChatCompleter, BoxSpeechSynthesizer, BoxTranscriber};
use parley_types::config::UpstreamConfig;
use parley_types::error::UpstreamError;

pub use self::chat::OpenAiChatCompleter;
pub use self::speech::OpenAiSpeechSynthesizer;
pub use self::transcription::OpenAiTranscriber;

/// Shared HTTP state for every OpenAI adapter.
///
/// Cheap to clone: the client is reference-counted internally and the key
/// sits behind an `Arc`.
#[derive(Clone)]
pub struct OpenAiConnection {
    client: reqwest::Client,
    api_key: Option<Arc<SecretString>>,
    base_url: String,
}

// No Debug derive: keeps the key out of any formatted output.

impl OpenAiConnection {
    /// Build a connection. Without a key, requests go out unauthenticated and
    /// the upstream's 401 reaches the caller like any other status.
    ///
    /// `timeout` of `None` keeps reqwest's default: no total request timeout.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<SecretString>,
        timeout: Option<Duration>,
    ) -> Result<Self, UpstreamError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| UpstreamError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.map(Arc::new),
            base_url: base_url.into(),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Build the full API URL for a given path.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let builder = self.client.post(self.url(path));
        match &self.api_key {
            Some(key) => builder.bearer_auth(key.expose_secret()),
            None => builder,
        }
    }

    /// Send a request and fail on any non-success status.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, UpstreamError> {
        let response = request
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Upstream returned an error status");
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

/// The three adapters the relay needs, boxed for the conversation service.
pub struct UpstreamAdapters {
    pub transcriber: BoxTranscriber,
    pub completer: BoxChatCompleter,
    pub synthesizer: BoxSpeechSynthesizer,
}

/// Create all OpenAI adapters from the upstream configuration.
pub fn create_openai_adapters(
    config: &UpstreamConfig,
    api_key: Option<SecretString>,
) -> Result<UpstreamAdapters, UpstreamError> {
    let connection = OpenAiConnection::new(
        config.base_url.clone(),
        api_key,
        config.timeout_secs.map(Duration::from_secs),
    )?;

    Ok(UpstreamAdapters {
        transcriber: BoxTranscriber::new(OpenAiTranscriber::new(
            connection.clone(),
            config.transcription_model.clone(),
            config.language.clone(),
        )),
        completer: BoxChatCompleter::new(OpenAiChatCompleter::new(
            connection.clone(),
            config.chat_model.clone(),
        )),
        synthesizer: BoxSpeechSynthesizer::new(OpenAiSpeechSynthesizer::new(
            connection,
            config.speech_model.clone(),
            config.voice.clone(),
            config.speech_instructions.clone(),
        )),
    })
}
