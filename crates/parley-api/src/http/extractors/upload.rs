//! Multipart form reading for the audio endpoints.
//!
//! Both `/transcribe` and `/process-audio` take a form with an `audio` file
//! field; `/process-audio` also accepts a `sessionId` text field. Other
//! fields are ignored.

use axum::extract::Multipart;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::StatusCode;

use parley_types::error::RelayError;
use parley_types::upstream::{AudioUpload, MAX_AUDIO_BYTES};

use crate::http::error::AppError;

/// Request body limit for the multipart routes: the audio cap plus room for
/// form framing and small text fields.
pub const UPLOAD_BODY_LIMIT: usize = MAX_AUDIO_BYTES + 64 * 1024;

pub const AUDIO_FIELD: &str = "audio";
pub const SESSION_FIELD: &str = "sessionId";

#[derive(Debug, Default)]
pub struct AudioForm {
    /// `None` when the form had no `audio` field.
    pub audio: Option<AudioUpload>,
    pub session_id: Option<String>,
}

impl AudioForm {
    /// The uploaded audio, or an `InvalidInput` error when none was sent.
    pub fn require_audio(&mut self) -> Result<AudioUpload, AppError> {
        self.audio
            .take()
            .ok_or_else(|| missing_audio().into())
    }
}

/// Read the audio form. A body that is not multipart at all counts as a
/// request without audio.
pub async fn read_audio_form(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<AudioForm, AppError> {
    let mut multipart = multipart.map_err(|_| AppError::from(missing_audio()))?;
    let mut form = AudioForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(AUDIO_FIELD) => {
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                form.audio = Some(AudioUpload::new(bytes.to_vec(), content_type));
            }
            Some(SESSION_FIELD) => {
                form.session_id = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }

    Ok(form)
}

fn missing_audio() -> RelayError {
    RelayError::InvalidInput("audio file is required".to_string())
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        RelayError::PayloadTooLarge {
            limit: MAX_AUDIO_BYTES,
        }
        .into()
    } else {
        AppError::Internal(err.body_text())
    }
}
