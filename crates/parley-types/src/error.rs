use thiserror::Error;

/// Errors from calls to an upstream speech or chat service.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The service answered with a non-success status. `body` is the raw
    /// response text, surfaced to the caller unchanged.
    #[error("upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("upstream request failed: {0}")]
    Transport(String),

    #[error("failed to decode upstream response: {0}")]
    Decode(String),

    /// The request could not be built from the caller's input.
    #[error("invalid upstream request: {0}")]
    InvalidRequest(String),
}

/// A stage of the audio round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Transcribe,
    Converse,
    Synthesize,
}

impl Stage {
    /// Fixed message reported to the client when this stage fails.
    pub fn failure_message(self) -> &'static str {
        match self {
            Stage::Transcribe => "recognition failed",
            Stage::Converse => "reply generation failed",
            Stage::Synthesize => "synthesis failed",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Transcribe => write!(f, "transcribe"),
            Stage::Converse => write!(f, "converse"),
            Stage::Synthesize => write!(f, "synthesize"),
        }
    }
}

/// Errors from relay operations (single adapters and the round trip).
#[derive(Debug, Error)]
pub enum RelayError {
    /// A required field was missing or empty.
    #[error("{0}")]
    InvalidInput(String),

    #[error("audio payload exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: usize },

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// Errors from loading relay configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },
}
