//! Typed chat and history reset.
//!
//! Endpoints:
//! - POST /chat                - Reply to a typed message
//! - POST /reset-conversation  - Clear the conversation history

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use crate::http::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatBody {
    #[serde(default)]
    pub message: Option<String>,
    /// Only honored when session isolation is enabled.
    #[serde(default, rename = "sessionId")]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub reply: String,
}

/// POST /chat - Append the message, ask the model, append and return the reply.
pub async fn chat(
    State(state): State<AppState>,
    body: Result<Json<ChatBody>, JsonRejection>,
) -> Result<Json<ChatReply>, AppError> {
    let Json(body) = body.map_err(|e| AppError::Validation(e.body_text()))?;
    let session = state.session_for(body.session_id.as_deref());
    let message = body.message.unwrap_or_default();

    let reply = state.service.chat(&session, &message).await?;
    Ok(Json(ChatReply { reply }))
}

#[derive(Debug, Default, Deserialize)]
pub struct ResetQuery {
    #[serde(default, rename = "sessionId")]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResetReply {
    pub message: &'static str,
}

/// POST /reset-conversation - Clear history. Idempotent.
pub async fn reset_conversation(
    State(state): State<AppState>,
    Query(query): Query<ResetQuery>,
) -> Json<ResetReply> {
    let session = state.session_for(query.session_id.as_deref());
    state.service.reset(&session);
    Json(ResetReply {
        message: "Conversation history has been reset",
    })
}
