//! Text-to-speech via `POST /audio/speech`, always requesting mp3.

use parley_core::upstream::provider::SpeechSynthesizer;
use parley_types::error::UpstreamError;

use super::OpenAiConnection;
use super::types::SpeechRequest;

pub struct OpenAiSpeechSynthesizer {
    connection: OpenAiConnection,
    model: String,
    voice: String,
    instructions: String,
}

impl OpenAiSpeechSynthesizer {
    pub fn new(connection: OpenAiConnection, model: String, voice: String, instructions: String) -> Self {
        Self {
            connection,
            model,
            voice,
            instructions,
        }
    }
}

impl SpeechSynthesizer for OpenAiSpeechSynthesizer {
    fn name(&self) -> &str {
        "openai"
    }

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, UpstreamError> {
        let body = SpeechRequest {
            model: &self.model,
            input: text,
            voice: &self.voice,
            instructions: &self.instructions,
            response_format: "mp3",
        };

        let response = self
            .connection
            .send(self.connection.post("/audio/speech").json(&body))
            .await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::Transport(format!("failed to read synthesized audio: {e}")))?;
        Ok(bytes.to_vec())
    }
}
