//! OpenAI REST payloads.
//!
//! Provider-specific request/response bodies. The provider-neutral shapes
//! live in `parley_types::upstream`.

use serde::{Deserialize, Serialize};

use parley_types::upstream::ChatMessage;

/// Response body of `POST /audio/transcriptions` (json format).
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionResponse {
    pub text: String,
}

/// Request body for `POST /chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub max_tokens: u32,
    pub temperature: f64,
}

/// Response body of `POST /chat/completions`. Only the fields the relay reads.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoiceMessage {
    /// Null when the model refused or returned only tool calls.
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Text of the first choice, if there is one.
    pub fn into_reply(self) -> Option<String> {
        self.choices.into_iter().next()?.message.content
    }
}

/// Request body for `POST /audio/speech`.
#[derive(Debug, Clone, Serialize)]
pub struct SpeechRequest<'a> {
    pub model: &'a str,
    pub input: &'a str,
    pub voice: &'a str,
    pub instructions: &'a str,
    pub response_format: &'static str,
}
