//! Application error type mapping relay failures to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use parley_core::conversation::turn::RoundTripError;
use parley_types::error::{RelayError, Stage, UpstreamError};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Failure from a single adapter call.
    Relay(RelayError),
    /// A round-trip stage failed; reported with its fixed message only.
    Stage(Stage),
    /// Malformed request body.
    Validation(String),
    Internal(String),
}

impl From<RelayError> for AppError {
    fn from(e: RelayError) -> Self {
        AppError::Relay(e)
    }
}

impl From<RoundTripError> for AppError {
    fn from(e: RoundTripError) -> Self {
        match e {
            RoundTripError::Rejected(e) => AppError::Relay(e),
            RoundTripError::StageFailed { stage, .. } => AppError::Stage(stage),
        }
    }
}

impl AppError {
    fn status_and_message(self) -> (StatusCode, String) {
        match self {
            AppError::Relay(RelayError::InvalidInput(msg)) => (StatusCode::BAD_REQUEST, msg),
            AppError::Relay(e @ RelayError::PayloadTooLarge { .. }) => {
                (StatusCode::PAYLOAD_TOO_LARGE, e.to_string())
            }
            // Upstream rejections keep their status and raw body.
            AppError::Relay(RelayError::Upstream(UpstreamError::Status { status, body })) => (
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                body,
            ),
            AppError::Relay(RelayError::Upstream(e @ UpstreamError::InvalidRequest(_))) => {
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            AppError::Relay(RelayError::Upstream(e)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            AppError::Stage(stage) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                stage.failure_message().to_string(),
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %message, "Request failed");
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}
