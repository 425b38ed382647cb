//! Audio endpoints.
//!
//! Endpoints:
//! - POST /transcribe     - Speech to text
//! - POST /synthesize     - Text to speech (raw mp3 body)
//! - POST /process-audio  - Speech in, reply text and speech out

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use parley_core::conversation::turn::RoundTripError;
use parley_types::upstream::SYNTHESIZED_AUDIO_MIME;

use crate::http::error::AppError;
use crate::http::extractors::upload::read_audio_form;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Transcript {
    pub text: String,
}

/// POST /transcribe - Transcribe the `audio` form field. History is untouched.
pub async fn transcribe(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Transcript>, AppError> {
    let mut form = read_audio_form(multipart).await?;
    let audio = form.require_audio()?;

    let text = state.service.transcribe(&audio).await?;
    Ok(Json(Transcript { text }))
}

#[derive(Debug, Deserialize)]
pub struct SynthesizeBody {
    #[serde(default)]
    pub text: Option<String>,
}

/// POST /synthesize - Speak `text`; responds with `audio/mp3` bytes.
pub async fn synthesize(
    State(state): State<AppState>,
    body: Result<Json<SynthesizeBody>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(body) = body.map_err(|e| AppError::Validation(e.body_text()))?;
    let text = body.text.unwrap_or_default();

    let audio = state.service.synthesize(&text).await?;
    Ok(([(header::CONTENT_TYPE, SYNTHESIZED_AUDIO_MIME)], audio).into_response())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedAudio {
    pub user_text: String,
    pub ai_reply: String,
    /// `data:audio/mp3;base64,...`
    pub audio_data: String,
}

/// POST /process-audio - The full round trip.
///
/// A stage failure answers 500 with that stage's fixed message. Whether the
/// utterances recorded before the failure stay in history depends on
/// `discard_partial_turns`.
pub async fn process_audio(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ProcessedAudio>, AppError> {
    let form = read_audio_form(multipart).await?;
    let session = state.session_for(form.session_id.as_deref());
    let audio = form.audio.unwrap_or_default();

    match state.service.round_trip(&session, &audio).await {
        Ok(trip) => Ok(Json(ProcessedAudio {
            audio_data: trip.audio_data_uri(),
            user_text: trip.user_text,
            ai_reply: trip.ai_reply,
        })),
        Err(err) => {
            if let RoundTripError::StageFailed { stage, cause, partial } = &err {
                tracing::error!(stage = %stage, error = %cause, "Process audio failed");
                if state.config.discard_partial_turns {
                    state.service.discard(&session, partial);
                }
            }
            Err(err.into())
        }
    }
}
