//! Chat completion via `POST /chat/completions`.

use parley_core::upstream::provider::ChatCompleter;
use parley_types::error::UpstreamError;
use parley_types::upstream::ChatRequest;

use super::OpenAiConnection;
use super::types::{ChatCompletionRequest, ChatCompletionResponse};

pub struct OpenAiChatCompleter {
    connection: OpenAiConnection,
    model: String,
}

impl OpenAiChatCompleter {
    pub fn new(connection: OpenAiConnection, model: String) -> Self {
        Self { connection, model }
    }
}

impl ChatCompleter for OpenAiChatCompleter {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<String, UpstreamError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: &request.messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };
        tracing::debug!(model = %self.model, messages = request.messages.len(), "Sending chat completion");

        let response = self
            .connection
            .send(self.connection.post("/chat/completions").json(&body))
            .await?;

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Decode(format!("failed to parse chat completion: {e}")))?;

        completion
            .into_reply()
            .ok_or_else(|| UpstreamError::Decode("chat completion contained no reply text".to_string()))
    }
}
