//! Data shapes exchanged with the upstream speech and chat services.
//!
//! These are provider-neutral: the infra adapters translate them into the
//! concrete HTTP payloads.

use serde::{Deserialize, Serialize};

use crate::conversation::{Role, Utterance};

/// Largest audio payload accepted for transcription (10 MiB).
pub const MAX_AUDIO_BYTES: usize = 10 * 1024 * 1024;

/// MIME type assumed when the caller does not label its upload.
pub const DEFAULT_AUDIO_MIME: &str = "audio/webm";

/// MIME type of synthesized speech.
pub const SYNTHESIZED_AUDIO_MIME: &str = "audio/mp3";

/// Recorded audio uploaded by the browser client.
#[derive(Debug, Clone, Default)]
pub struct AudioUpload {
    pub bytes: Vec<u8>,
    /// MIME type as supplied by the caller, passed through unchanged.
    pub content_type: Option<String>,
}

impl AudioUpload {
    pub fn new(bytes: Vec<u8>, content_type: Option<String>) -> Self {
        Self {
            bytes,
            content_type,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// The caller's MIME type, or [`DEFAULT_AUDIO_MIME`] when absent or blank.
    pub fn mime_type(&self) -> &str {
        self.content_type
            .as_deref()
            .filter(|ct| !ct.trim().is_empty())
            .unwrap_or(DEFAULT_AUDIO_MIME)
    }
}

/// One entry of the message list sent to the chat-completion service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

impl From<&Utterance> for ChatMessage {
    fn from(utterance: &Utterance) -> Self {
        Self {
            role: utterance.role,
            content: utterance.content.clone(),
        }
    }
}

/// A chat-completion request: system instruction followed by recent history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f64,
}
