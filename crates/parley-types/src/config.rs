//! Relay configuration types.
//!
//! `RelayConfig` is loaded once at startup (optional `parley.toml` plus
//! environment overrides) and shared read-only afterwards. All fields have
//! defaults so an empty file, or no file at all, is a valid configuration.

use serde::{Deserialize, Serialize};

/// Default persona given to the chat model.
pub const DEFAULT_INSTRUCTION: &str = "You are a helpful English conversation partner. \
Please speak clearly and help the user practice English.";

/// Top-level relay configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayConfig {
    /// System instruction prepended to every chat request.
    #[serde(default = "default_instruction")]
    pub instruction: String,

    /// Title shown by the browser client.
    #[serde(default = "default_task_title")]
    pub task_title: String,

    /// Subtitle shown by the browser client.
    #[serde(default = "default_task_description")]
    pub task_description: String,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory of static files for the browser client.
    #[serde(default = "default_public_dir")]
    pub public_dir: String,

    /// Number of most recent utterances sent with each chat request.
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Give each client its own history, keyed by the `sessionId` it sends.
    /// Off by default: every caller shares one conversation.
    #[serde(default)]
    pub isolate_sessions: bool,

    /// Remove the utterances of a round trip that failed part-way.
    /// Off by default: partial turns stay in history.
    #[serde(default)]
    pub discard_partial_turns: bool,

    #[serde(default)]
    pub upstream: UpstreamConfig,
}

fn default_instruction() -> String {
    DEFAULT_INSTRUCTION.to_string()
}

fn default_task_title() -> String {
    "English Conversation Practice".to_string()
}

fn default_task_description() -> String {
    "Enjoy a conversation in English with the AI.".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3003
}

fn default_public_dir() -> String {
    "public".to_string()
}

fn default_history_window() -> usize {
    10
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            instruction: default_instruction(),
            task_title: default_task_title(),
            task_description: default_task_description(),
            host: default_host(),
            port: default_port(),
            public_dir: default_public_dir(),
            history_window: default_history_window(),
            isolate_sessions: false,
            discard_partial_turns: false,
            upstream: UpstreamConfig::default(),
        }
    }
}

/// Settings for the upstream OpenAI-compatible services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_transcription_model")]
    pub transcription_model: String,

    /// Language hint sent with every transcription.
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_speech_model")]
    pub speech_model: String,

    #[serde(default = "default_voice")]
    pub voice: String,

    /// Delivery-style instruction for the speech model.
    #[serde(default = "default_speech_instructions")]
    pub speech_instructions: String,

    /// Total per-request timeout. Unset leaves the HTTP client default,
    /// which never cuts a request off.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_transcription_model() -> String {
    "whisper-1".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_chat_model() -> String {
    "gpt-4o".to_string()
}

fn default_max_tokens() -> u32 {
    150
}

fn default_temperature() -> f64 {
    0.7
}

fn default_speech_model() -> String {
    "gpt-4o-mini-tts".to_string()
}

fn default_voice() -> String {
    "coral".to_string()
}

fn default_speech_instructions() -> String {
    "Speak in a clear, helpful, and encouraging tone. \
     Use a moderate pace suitable for English learners."
        .to_string()
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            transcription_model: default_transcription_model(),
            language: default_language(),
            chat_model: default_chat_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            speech_model: default_speech_model(),
            voice: default_voice(),
            speech_instructions: default_speech_instructions(),
            timeout_secs: None,
        }
    }
}
