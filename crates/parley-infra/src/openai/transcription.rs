//! Speech-to-text via `POST /audio/transcriptions`.

use reqwest::multipart::{Form, Part};

use parley_core::upstream::provider::Transcriber;
use parley_types::error::UpstreamError;
use parley_types::upstream::AudioUpload;

use super::OpenAiConnection;
use super::types::TranscriptionResponse;

/// File name attached to every upload; the service infers the container
/// from it together with the part's MIME type.
const UPLOAD_FILE_NAME: &str = "audio.webm";

pub struct OpenAiTranscriber {
    connection: OpenAiConnection,
    model: String,
    language: String,
}

impl OpenAiTranscriber {
    pub fn new(connection: OpenAiConnection, model: String, language: String) -> Self {
        Self {
            connection,
            model,
            language,
        }
    }

    fn form(&self, audio: &AudioUpload) -> Result<Form, UpstreamError> {
        let file = Part::bytes(audio.bytes.clone())
            .file_name(UPLOAD_FILE_NAME)
            .mime_str(audio.mime_type())
            .map_err(|e| UpstreamError::InvalidRequest(format!("invalid audio content type: {e}")))?;

        Ok(Form::new()
            .part("file", file)
            .text("model", self.model.clone())
            .text("language", self.language.clone()))
    }
}

impl Transcriber for OpenAiTranscriber {
    fn name(&self) -> &str {
        "openai"
    }

    async fn transcribe(&self, audio: &AudioUpload) -> Result<String, UpstreamError> {
        let form = self.form(audio)?;
        let request = self.connection.post("/audio/transcriptions").multipart(form);
        let response = self.connection.send(request).await?;

        let body: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Decode(format!("failed to parse transcription: {e}")))?;
        Ok(body.text)
    }
}
