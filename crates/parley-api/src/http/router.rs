//! Axum router configuration with middleware.
//!
//! Middleware: CORS (any origin; GET, POST, OPTIONS), request tracing, and a
//! raised body limit on the two multipart routes.
//!
//! Unknown paths fall through to static files under the configured public
//! directory (the browser client). If the directory does not exist, only the
//! API is served.

use std::path::Path;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::http::extractors::upload::UPLOAD_BODY_LIMIT;
use crate::http::handlers::{audio, chat, info};
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    let public_dir = state.config.public_dir.clone();

    let mut router = Router::new()
        .route("/", get(info::root))
        .route("/health", get(info::health))
        .route("/task-config", get(info::task_config))
        .route(
            "/transcribe",
            post(audio::transcribe).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/chat", post(chat::chat))
        .route("/synthesize", post(audio::synthesize))
        .route(
            "/process-audio",
            post(audio::process_audio).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/reset-conversation", post(chat::reset_conversation))
        .with_state(state);

    if Path::new(&public_dir).is_dir() {
        router = router.fallback_service(ServeDir::new(&public_dir));
        tracing::info!(path = %public_dir, "Static file serving enabled");
    }

    router.layer(cors).layer(TraceLayer::new_for_http())
}
