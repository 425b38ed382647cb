//! Results of an audio round trip.
//!
//! A round trip either completes with every artifact, or fails at one
//! [`Stage`] carrying whatever it produced before failing. The caller decides
//! whether the partially recorded turn stays in history.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;
use uuid::Uuid;

use parley_types::error::{RelayError, Stage};
use parley_types::upstream::SYNTHESIZED_AUDIO_MIME;

/// Artifacts a round trip produced before it stopped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialTurn {
    /// What the learner said, once transcription succeeded.
    pub user_text: Option<String>,
    /// The assistant's reply, once the chat call succeeded.
    pub ai_reply: Option<String>,
    /// Ids of the utterances this turn appended to history, in order.
    pub appended: Vec<Uuid>,
}

/// A completed speech-in, speech-out exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundTrip {
    pub user_text: String,
    pub ai_reply: String,
    /// Synthesized reply audio (mp3).
    pub audio: Vec<u8>,
}

impl RoundTrip {
    /// The reply audio as a `data:audio/mp3;base64,...` URI.
    pub fn audio_data_uri(&self) -> String {
        format!(
            "data:{SYNTHESIZED_AUDIO_MIME};base64,{}",
            STANDARD.encode(&self.audio)
        )
    }
}

/// Why a round trip did not complete.
#[derive(Debug, Error)]
pub enum RoundTripError {
    /// The request was rejected before any stage ran.
    #[error(transparent)]
    Rejected(RelayError),

    /// A stage failed. The display text is the stage's fixed message; the
    /// upstream detail is kept in `cause` for logging only.
    #[error("{}", .stage.failure_message())]
    StageFailed {
        stage: Stage,
        cause: RelayError,
        partial: PartialTurn,
    },
}

impl RoundTripError {
    /// The partial turn left behind, if any stage ran.
    pub fn partial(&self) -> Option<&PartialTurn> {
        match self {
            RoundTripError::Rejected(_) => None,
            RoundTripError::StageFailed { partial, .. } => Some(partial),
        }
    }

    pub fn stage(&self) -> Option<Stage> {
        match self {
            RoundTripError::Rejected(_) => None,
            RoundTripError::StageFailed { stage, .. } => Some(*stage),
        }
    }
}
