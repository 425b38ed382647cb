//! Informational endpoints: service banner, health, task configuration.

use axum::Json;
use axum::extract::State;
use serde::Serialize;
use serde_json::json;

use crate::state::AppState;

/// GET / - Service banner with the endpoint map.
pub async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Parley speech conversation relay",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "/task-config": "Get the practice task title and description",
            "/transcribe": "Convert recorded speech to text",
            "/chat": "Generate a conversational reply",
            "/synthesize": "Convert text to speech (mp3)",
            "/process-audio": "Transcribe, reply and synthesize in one call",
            "/reset-conversation": "Clear the conversation history",
        }
    }))
}

/// GET /health - Liveness probe.
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[derive(Debug, Serialize)]
pub struct TaskConfig {
    pub title: String,
    pub description: String,
}

/// GET /task-config - Title and subtitle for the browser client.
pub async fn task_config(State(state): State<AppState>) -> Json<TaskConfig> {
    Json(TaskConfig {
        title: state.config.task_title.clone(),
        description: state.config.task_description.clone(),
    })
}
