//! Conversation service chaining transcription, chat, and speech synthesis.
//!
//! `ConversationService` owns the three upstream adapters and the
//! conversation store. It exposes each adapter on its own (with input
//! validation and history bookkeeping for chat) and the composed audio
//! round trip. Every chat request is built the same way: append the new
//! user utterance first, then send the system instruction followed by the
//! last `history_window` utterances.

use std::sync::Arc;

use tracing::{Instrument, debug, info, info_span, warn};

use parley_types::config::RelayConfig;
use parley_types::conversation::{SessionKey, Utterance};
use parley_types::error::{RelayError, Stage, UpstreamError};
use parley_types::upstream::{AudioUpload, ChatMessage, ChatRequest, MAX_AUDIO_BYTES};

use crate::upstream::box_provider::{BoxChatCompleter, BoxSpeechSynthesizer, BoxTranscriber};

use super::store::ConversationStore;
use super::turn::{PartialTurn, RoundTrip, RoundTripError};

/// Chat-request settings, resolved once from [`RelayConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationSettings {
    /// System instruction placed first in every chat request.
    pub instruction: String,
    /// How many recent utterances accompany each chat request.
    pub history_window: usize,
    pub max_tokens: u32,
    pub temperature: f64,
    /// Largest accepted audio upload in bytes.
    pub max_audio_bytes: usize,
}

impl From<&RelayConfig> for ConversationSettings {
    fn from(config: &RelayConfig) -> Self {
        Self {
            instruction: config.instruction.clone(),
            history_window: config.history_window,
            max_tokens: config.upstream.max_tokens,
            temperature: config.upstream.temperature,
            max_audio_bytes: MAX_AUDIO_BYTES,
        }
    }
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self::from(&RelayConfig::default())
    }
}

/// Orchestrates the relay's upstream calls and conversation history.
pub struct ConversationService {
    transcriber: BoxTranscriber,
    completer: BoxChatCompleter,
    synthesizer: BoxSpeechSynthesizer,
    store: Arc<dyn ConversationStore>,
    settings: ConversationSettings,
}

impl ConversationService {
    pub fn new(
        transcriber: BoxTranscriber,
        completer: BoxChatCompleter,
        synthesizer: BoxSpeechSynthesizer,
        store: Arc<dyn ConversationStore>,
        settings: ConversationSettings,
    ) -> Self {
        Self {
            transcriber,
            completer,
            synthesizer,
            store,
            settings,
        }
    }

    /// Access the conversation store.
    pub fn store(&self) -> &Arc<dyn ConversationStore> {
        &self.store
    }

    // --- Single adapters ---

    /// Transcribe an uploaded recording.
    ///
    /// Rejects empty or oversized uploads before any network call. Upstream
    /// failures are returned unchanged.
    pub async fn transcribe(&self, audio: &AudioUpload) -> Result<String, RelayError> {
        self.validate_audio(audio)?;
        let text = self.transcribe_unchecked(audio).await?;
        Ok(text)
    }

    /// Send a typed message and return the assistant's reply.
    ///
    /// The user utterance is recorded before the upstream call and stays in
    /// history if that call fails.
    pub async fn chat(&self, session: &SessionKey, message: &str) -> Result<String, RelayError> {
        if message.is_empty() {
            return Err(RelayError::InvalidInput("message is required".to_string()));
        }

        let mut turn = PartialTurn::default();
        let reply = self.converse(session, message, &mut turn).await?;
        Ok(reply)
    }

    /// Synthesize speech for `text`, returning mp3 bytes.
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>, RelayError> {
        if text.is_empty() {
            return Err(RelayError::InvalidInput("text is required".to_string()));
        }
        let audio = self.synthesize_unchecked(text).await?;
        Ok(audio)
    }

    // --- Round trip ---

    /// Speech in, speech out: transcribe, reply, synthesize.
    ///
    /// Stages run strictly in order and the first failure stops the
    /// transaction. Utterances appended by earlier stages are left in
    /// history; the returned [`PartialTurn`] lets the caller remove them
    /// with [`ConversationService::discard`].
    pub async fn round_trip(
        &self,
        session: &SessionKey,
        audio: &AudioUpload,
    ) -> Result<RoundTrip, RoundTripError> {
        self.validate_audio(audio).map_err(RoundTripError::Rejected)?;

        let mut turn = PartialTurn::default();

        let user_text = match self.transcribe_unchecked(audio).await {
            Ok(text) => text,
            Err(e) => return Err(stage_failed(Stage::Transcribe, e, turn)),
        };
        debug!(session = %session, user_text = %user_text, "Learner said");
        turn.user_text = Some(user_text.clone());

        let ai_reply = match self.converse(session, &user_text, &mut turn).await {
            Ok(reply) => reply,
            Err(e) => return Err(stage_failed(Stage::Converse, e, turn)),
        };
        turn.ai_reply = Some(ai_reply.clone());

        let audio = match self.synthesize_unchecked(&ai_reply).await {
            Ok(bytes) => bytes,
            Err(e) => return Err(stage_failed(Stage::Synthesize, e, turn)),
        };

        info!(
            session = %session,
            audio_bytes = audio.len(),
            "Round trip complete"
        );

        Ok(RoundTrip {
            user_text,
            ai_reply,
            audio,
        })
    }

    /// Remove the utterances a failed round trip appended.
    pub fn discard(&self, session: &SessionKey, partial: &PartialTurn) -> usize {
        if partial.appended.is_empty() {
            return 0;
        }
        let removed = self.store.remove(session, &partial.appended);
        info!(session = %session, removed, "Discarded partial turn");
        removed
    }

    // --- History ---

    /// Clear a session's history. Safe to call repeatedly.
    pub fn reset(&self, session: &SessionKey) -> usize {
        let dropped = self.store.reset(session);
        info!(session = %session, dropped, "Conversation reset");
        dropped
    }

    /// The utterances that would accompany the next chat request.
    pub fn recent_history(&self, session: &SessionKey) -> Vec<Utterance> {
        self.store.last_n(session, self.settings.history_window)
    }

    /// Build the chat request for a session's current history:
    /// `[system instruction] + last_n(history, window)`.
    pub fn build_chat_request(&self, session: &SessionKey) -> ChatRequest {
        let history = self.recent_history(session);
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage::system(self.settings.instruction.clone()));
        messages.extend(history.iter().map(ChatMessage::from));

        ChatRequest {
            messages,
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        }
    }

    // --- Internals ---

    fn validate_audio(&self, audio: &AudioUpload) -> Result<(), RelayError> {
        if audio.is_empty() {
            return Err(RelayError::InvalidInput("audio file is required".to_string()));
        }
        if audio.len() > self.settings.max_audio_bytes {
            return Err(RelayError::PayloadTooLarge {
                limit: self.settings.max_audio_bytes,
            });
        }
        Ok(())
    }

    async fn transcribe_unchecked(&self, audio: &AudioUpload) -> Result<String, UpstreamError> {
        let span = info_span!(
            "gen_ai.transcribe",
            gen_ai.system = self.transcriber.name(),
            audio.bytes = audio.len(),
            audio.mime = %audio.mime_type(),
        );
        self.transcriber.transcribe(audio).instrument(span).await
    }

    /// Record the user utterance, ask for a reply, record the reply.
    async fn converse(
        &self,
        session: &SessionKey,
        message: &str,
        turn: &mut PartialTurn,
    ) -> Result<String, UpstreamError> {
        let user = Utterance::user(message);
        turn.appended.push(user.id);
        self.store.append(session, user);

        let request = self.build_chat_request(session);
        let span = info_span!(
            "gen_ai.chat",
            gen_ai.system = self.completer.name(),
            gen_ai.request.max_tokens = request.max_tokens,
            gen_ai.request.temperature = request.temperature,
            history.len = request.messages.len() - 1,
        );
        let reply = self.completer.complete(&request).instrument(span).await?;
        debug!(session = %session, reply = %reply, "Assistant replied");

        let assistant = Utterance::assistant(reply.clone());
        turn.appended.push(assistant.id);
        self.store.append(session, assistant);

        Ok(reply)
    }

    async fn synthesize_unchecked(&self, text: &str) -> Result<Vec<u8>, UpstreamError> {
        let span = info_span!(
            "gen_ai.synthesize",
            gen_ai.system = self.synthesizer.name(),
            text.len = text.len(),
        );
        self.synthesizer.synthesize(text).instrument(span).await
    }
}

fn stage_failed(stage: Stage, cause: UpstreamError, partial: PartialTurn) -> RoundTripError {
    warn!(stage = %stage, error = %cause, "Round trip stage failed");
    RoundTripError::StageFailed {
        stage,
        cause: cause.into(),
        partial,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parley_types::conversation::Role;

    use super::*;
    use crate::conversation::store::InMemoryConversationStore;
    use crate::upstream::provider::{ChatCompleter, SpeechSynthesizer, Transcriber};

    /// Call counters shared between a test and the boxed mocks it builds.
    #[derive(Default)]
    struct Calls {
        transcribe: AtomicUsize,
        chat: AtomicUsize,
        synthesize: AtomicUsize,
        last_request: Mutex<Option<ChatRequest>>,
    }

    fn upstream_failure() -> UpstreamError {
        UpstreamError::Status {
            status: 502,
            body: "{\"error\":\"bad gateway\"}".to_string(),
        }
    }

    struct MockTranscriber {
        calls: Arc<Calls>,
        fail: bool,
    }

    impl Transcriber for MockTranscriber {
        fn name(&self) -> &str {
            "mock"
        }

        async fn transcribe(&self, _audio: &AudioUpload) -> Result<String, UpstreamError> {
            self.calls.transcribe.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(upstream_failure())
            } else {
                Ok("I went to the park yesterday".to_string())
            }
        }
    }

    struct MockCompleter {
        calls: Arc<Calls>,
        fail: bool,
    }

    impl ChatCompleter for MockCompleter {
        fn name(&self) -> &str {
            "mock"
        }

        async fn complete(&self, request: &ChatRequest) -> Result<String, UpstreamError> {
            let n = self.calls.chat.fetch_add(1, Ordering::SeqCst);
            *self.calls.last_request.lock().unwrap() = Some(request.clone());
            if self.fail {
                Err(upstream_failure())
            } else {
                Ok(format!("reply {n}"))
            }
        }
    }

    struct MockSynthesizer {
        calls: Arc<Calls>,
        fail: bool,
    }

    impl SpeechSynthesizer for MockSynthesizer {
        fn name(&self) -> &str {
            "mock"
        }

        async fn synthesize(&self, _text: &str) -> Result<Vec<u8>, UpstreamError> {
            self.calls.synthesize.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(upstream_failure())
            } else {
                Ok(vec![0xFF, 0xF3, 0x44, 0xC4])
            }
        }
    }

    #[derive(Default, Clone, Copy)]
    struct Failures {
        transcribe: bool,
        chat: bool,
        synthesize: bool,
    }

    fn service_with(failures: Failures) -> (ConversationService, Arc<Calls>) {
        let calls = Arc::new(Calls::default());
        let service = ConversationService::new(
            BoxTranscriber::new(MockTranscriber {
                calls: Arc::clone(&calls),
                fail: failures.transcribe,
            }),
            BoxChatCompleter::new(MockCompleter {
                calls: Arc::clone(&calls),
                fail: failures.chat,
            }),
            BoxSpeechSynthesizer::new(MockSynthesizer {
                calls: Arc::clone(&calls),
                fail: failures.synthesize,
            }),
            Arc::new(InMemoryConversationStore::new()),
            ConversationSettings::default(),
        );
        (service, calls)
    }

    fn audio() -> AudioUpload {
        AudioUpload::new(vec![0x1A, 0x45, 0xDF, 0xA3], Some("audio/webm".to_string()))
    }

    fn history_len(service: &ConversationService) -> usize {
        service.store().count(&SessionKey::shared())
    }

    // --- chat ---

    #[tokio::test]
    async fn test_chat_success_appends_user_then_assistant() {
        let (service, _) = service_with(Failures::default());
        let key = SessionKey::shared();

        let reply = service.chat(&key, "Hello").await.unwrap();
        assert_eq!(reply, "reply 0");

        let history = service.recent_history(&key);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[0].content, "Hello");
        assert_eq!(history[1].role, Role::Assistant);
        assert_eq!(history[1].content, "reply 0");
    }

    #[tokio::test]
    async fn test_chat_failure_keeps_user_utterance() {
        let (service, _) = service_with(Failures {
            chat: true,
            ..Default::default()
        });

        let err = service.chat(&SessionKey::shared(), "Hello").await.unwrap_err();
        assert!(matches!(
            err,
            RelayError::Upstream(UpstreamError::Status { status: 502, .. })
        ));
        assert_eq!(history_len(&service), 1);
    }

    #[tokio::test]
    async fn test_chat_rejects_empty_message_without_upstream_call() {
        let (service, calls) = service_with(Failures::default());
        let err = service.chat(&SessionKey::shared(), "").await.unwrap_err();
        assert!(matches!(err, RelayError::InvalidInput(_)));
        assert_eq!(calls.chat.load(Ordering::SeqCst), 0);
        assert_eq!(history_len(&service), 0);
    }

    #[tokio::test]
    async fn test_chat_request_is_system_plus_last_ten_including_new_message() {
        let (service, calls) = service_with(Failures::default());
        let key = SessionKey::shared();
        for i in 0..7 {
            service.chat(&key, &format!("message {i}")).await.unwrap();
        }
        // 14 utterances recorded before this call; the new one makes 15.
        service.chat(&key, "latest").await.unwrap();

        let request = calls.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.messages.len(), 11);
        assert_eq!(request.messages[0].role, Role::System);
        assert!(request.messages[0].content.contains("English conversation partner"));
        let last = request.messages.last().unwrap();
        assert_eq!(last.role, Role::User);
        assert_eq!(last.content, "latest");
        assert_eq!(request.max_tokens, 150);
        assert!((request.temperature - 0.7).abs() < f64::EPSILON);
        assert_eq!(history_len(&service), 16);
    }

    // --- transcribe / synthesize ---

    #[tokio::test]
    async fn test_transcribe_rejects_empty_audio_without_upstream_call() {
        let (service, calls) = service_with(Failures::default());
        let err = service.transcribe(&AudioUpload::default()).await.unwrap_err();
        assert!(matches!(err, RelayError::InvalidInput(_)));
        assert_eq!(calls.transcribe.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_transcribe_rejects_oversized_audio() {
        let (service, calls) = service_with(Failures::default());
        let big = AudioUpload::new(vec![0; MAX_AUDIO_BYTES + 1], None);
        let err = service.transcribe(&big).await.unwrap_err();
        assert!(matches!(err, RelayError::PayloadTooLarge { .. }));
        assert_eq!(calls.transcribe.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_transcribe_does_not_touch_history() {
        let (service, _) = service_with(Failures::default());
        let text = service.transcribe(&audio()).await.unwrap();
        assert_eq!(text, "I went to the park yesterday");
        assert_eq!(history_len(&service), 0);
    }

    #[tokio::test]
    async fn test_synthesize_requires_text() {
        let (service, calls) = service_with(Failures::default());
        assert!(matches!(
            service.synthesize("").await.unwrap_err(),
            RelayError::InvalidInput(_)
        ));
        assert_eq!(calls.synthesize.load(Ordering::SeqCst), 0);
        assert_eq!(service.synthesize("Hi").await.unwrap().len(), 4);
    }

    // --- round trip ---

    #[tokio::test]
    async fn test_round_trip_success() {
        let (service, calls) = service_with(Failures::default());
        let trip = service
            .round_trip(&SessionKey::shared(), &audio())
            .await
            .unwrap();

        assert_eq!(trip.user_text, "I went to the park yesterday");
        assert_eq!(trip.ai_reply, "reply 0");
        let uri = trip.audio_data_uri();
        assert!(uri.starts_with("data:audio/mp3;base64,"));
        assert!(uri.len() > "data:audio/mp3;base64,".len());
        assert_eq!(history_len(&service), 2);
        assert_eq!(calls.synthesize.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_round_trip_rejects_empty_audio() {
        let (service, calls) = service_with(Failures::default());
        let err = service
            .round_trip(&SessionKey::shared(), &AudioUpload::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RoundTripError::Rejected(RelayError::InvalidInput(_))));
        assert_eq!(calls.transcribe.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_round_trip_transcription_failure_stops_everything() {
        let (service, calls) = service_with(Failures {
            transcribe: true,
            ..Default::default()
        });
        let err = service
            .round_trip(&SessionKey::shared(), &audio())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "recognition failed");
        assert_eq!(err.partial(), Some(&PartialTurn::default()));
        assert_eq!(calls.chat.load(Ordering::SeqCst), 0);
        assert_eq!(calls.synthesize.load(Ordering::SeqCst), 0);
        assert_eq!(history_len(&service), 0);
    }

    #[tokio::test]
    async fn test_round_trip_chat_failure_strands_user_utterance() {
        let (service, calls) = service_with(Failures {
            chat: true,
            ..Default::default()
        });
        let err = service
            .round_trip(&SessionKey::shared(), &audio())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "reply generation failed");
        let partial = err.partial().unwrap();
        assert_eq!(partial.user_text.as_deref(), Some("I went to the park yesterday"));
        assert!(partial.ai_reply.is_none());
        assert_eq!(partial.appended.len(), 1);
        assert_eq!(calls.synthesize.load(Ordering::SeqCst), 0);
        assert_eq!(history_len(&service), 1);
    }

    #[tokio::test]
    async fn test_round_trip_synthesis_failure_keeps_both_utterances() {
        let (service, _) = service_with(Failures {
            synthesize: true,
            ..Default::default()
        });
        let err = service
            .round_trip(&SessionKey::shared(), &audio())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "synthesis failed");
        assert_eq!(err.stage(), Some(Stage::Synthesize));
        let partial = err.partial().unwrap();
        assert_eq!(partial.ai_reply.as_deref(), Some("reply 0"));
        assert_eq!(partial.appended.len(), 2);
        assert_eq!(history_len(&service), 2);
    }

    #[tokio::test]
    async fn test_discard_removes_only_the_failed_turn() {
        let (service, _) = service_with(Failures {
            synthesize: true,
            ..Default::default()
        });
        let key = SessionKey::shared();
        service.store().append(&key, Utterance::user("earlier"));

        let err = service.round_trip(&key, &audio()).await.unwrap_err();
        assert_eq!(history_len(&service), 3);

        let removed = service.discard(&key, err.partial().unwrap());
        assert_eq!(removed, 2);
        let history = service.recent_history(&key);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].content, "earlier");
    }

    #[tokio::test]
    async fn test_reset_twice_yields_empty_history() {
        let (service, _) = service_with(Failures::default());
        let key = SessionKey::shared();
        service.chat(&key, "Hello").await.unwrap();

        assert_eq!(service.reset(&key), 2);
        assert!(service.recent_history(&key).is_empty());
        assert_eq!(service.reset(&key), 0);
        assert!(service.recent_history(&key).is_empty());
    }

    #[tokio::test]
    async fn test_sessions_do_not_share_context() {
        let (service, calls) = service_with(Failures::default());
        service.chat(&SessionKey::new("a"), "from a").await.unwrap();
        service.chat(&SessionKey::new("b"), "from b").await.unwrap();

        let request = calls.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[1].content, "from b");
    }
}
