//! Object-safe dynamic dispatch wrappers for the upstream adapter traits.
//!
//! Same blanket-impl pattern for each capability:
//! 1. An object-safe `*Dyn` trait with boxed futures
//! 2. A blanket impl of it for every implementor of the RPITIT trait
//! 3. A `Box*` struct wrapping `Box<dyn *Dyn>` and delegating

use std::future::Future;
use std::pin::Pin;

use parley_types::error::UpstreamError;
use parley_types::upstream::{AudioUpload, ChatRequest};

use super::provider::{ChatCompleter, SpeechSynthesizer, Transcriber};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, UpstreamError>> + Send + 'a>>;

/// Object-safe version of [`Transcriber`].
pub trait TranscriberDyn: Send + Sync {
    fn name(&self) -> &str;

    fn transcribe_boxed<'a>(&'a self, audio: &'a AudioUpload) -> BoxFuture<'a, String>;
}

impl<T: Transcriber> TranscriberDyn for T {
    fn name(&self) -> &str {
        Transcriber::name(self)
    }

    fn transcribe_boxed<'a>(&'a self, audio: &'a AudioUpload) -> BoxFuture<'a, String> {
        Box::pin(self.transcribe(audio))
    }
}

/// Object-safe version of [`ChatCompleter`].
pub trait ChatCompleterDyn: Send + Sync {
    fn name(&self) -> &str;

    fn complete_boxed<'a>(&'a self, request: &'a ChatRequest) -> BoxFuture<'a, String>;
}

impl<T: ChatCompleter> ChatCompleterDyn for T {
    fn name(&self) -> &str {
        ChatCompleter::name(self)
    }

    fn complete_boxed<'a>(&'a self, request: &'a ChatRequest) -> BoxFuture<'a, String> {
        Box::pin(self.complete(request))
    }
}

/// Object-safe version of [`SpeechSynthesizer`].
pub trait SpeechSynthesizerDyn: Send + Sync {
    fn name(&self) -> &str;

    fn synthesize_boxed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Vec<u8>>;
}

impl<T: SpeechSynthesizer> SpeechSynthesizerDyn for T {
    fn name(&self) -> &str {
        SpeechSynthesizer::name(self)
    }

    fn synthesize_boxed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Vec<u8>> {
        Box::pin(self.synthesize(text))
    }
}

/// Type-erased transcription backend.
pub struct BoxTranscriber {
    inner: Box<dyn TranscriberDyn>,
}

impl BoxTranscriber {
    pub fn new<T: Transcriber + 'static>(transcriber: T) -> Self {
        Self {
            inner: Box::new(transcriber),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn transcribe(&self, audio: &AudioUpload) -> Result<String, UpstreamError> {
        self.inner.transcribe_boxed(audio).await
    }
}

/// Type-erased chat-completion backend.
pub struct BoxChatCompleter {
    inner: Box<dyn ChatCompleterDyn>,
}

impl BoxChatCompleter {
    pub fn new<T: ChatCompleter + 'static>(completer: T) -> Self {
        Self {
            inner: Box::new(completer),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn complete(&self, request: &ChatRequest) -> Result<String, UpstreamError> {
        self.inner.complete_boxed(request).await
    }
}

/// Type-erased speech-synthesis backend.
pub struct BoxSpeechSynthesizer {
    inner: Box<dyn SpeechSynthesizerDyn>,
}

impl BoxSpeechSynthesizer {
    pub fn new<T: SpeechSynthesizer + 'static>(synthesizer: T) -> Self {
        Self {
            inner: Box::new(synthesizer),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>, UpstreamError> {
        self.inner.synthesize_boxed(text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTranscriber;

    impl Transcriber for EchoTranscriber {
        fn name(&self) -> &str {
            "echo"
        }

        async fn transcribe(&self, audio: &AudioUpload) -> Result<String, UpstreamError> {
            Ok(format!("{} bytes", audio.len()))
        }
    }

    struct FailingCompleter;

    impl ChatCompleter for FailingCompleter {
        fn name(&self) -> &str {
            "failing"
        }

        async fn complete(&self, _request: &ChatRequest) -> Result<String, UpstreamError> {
            Err(UpstreamError::Status {
                status: 503,
                body: "unavailable".to_string(),
            })
        }
    }

    struct ToneSynthesizer;

    impl SpeechSynthesizer for ToneSynthesizer {
        fn name(&self) -> &str {
            "tone"
        }

        async fn synthesize(&self, text: &str) -> Result<Vec<u8>, UpstreamError> {
            Ok(text.bytes().rev().collect())
        }
    }

    #[tokio::test]
    async fn test_box_transcriber_delegates() {
        let boxed = BoxTranscriber::new(EchoTranscriber);
        assert_eq!(boxed.name(), "echo");
        let text = boxed
            .transcribe(&AudioUpload::new(vec![0; 4], None))
            .await
            .unwrap();
        assert_eq!(text, "4 bytes");
    }

    #[tokio::test]
    async fn test_box_chat_completer_propagates_error() {
        let boxed = BoxChatCompleter::new(FailingCompleter);
        let request = ChatRequest {
            messages: vec![],
            max_tokens: 150,
            temperature: 0.7,
        };
        let err = boxed.complete(&request).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_box_speech_synthesizer_delegates() {
        let boxed = BoxSpeechSynthesizer::new(ToneSynthesizer);
        assert_eq!(boxed.name(), "tone");
        assert_eq!(boxed.synthesize("ab").await.unwrap(), b"ba".to_vec());
    }
}
