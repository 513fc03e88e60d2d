//! The relay's error taxonomy.
//!
//! Every failure path renders as the same JSON envelope,
//! `{"error": {"message": ..., "type"?: ...}}`, so browser clients only ever
//! have to handle one error shape.
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("API key is required")]
    MissingApiKey,
    #[error("Messages array is required")]
    MessagesRequired,
    #[error("Invalid JSON body")]
    InvalidBody,
    #[error("Method not allowed")]
    MethodNotAllowed,
    /// The upstream answered with a non-success status. Its error object (or
    /// a generic fallback) is mirrored back under the envelope.
    #[error("upstream returned {status}")]
    Upstream { status: StatusCode, error: Value },
    /// Anything unexpected: connect failures, unreadable upstream bodies.
    #[error("{0}")]
    Internal(String),
}

fn envelope(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": { "message": message } }))).into_response()
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        match self {
            RelayError::Upstream { status, error } => {
                (status, Json(json!({ "error": error }))).into_response()
            }
            RelayError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": { "message": message, "type": "internal_server_error" }
                })),
            )
                .into_response(),
            error @ RelayError::MethodNotAllowed => {
                envelope(StatusCode::METHOD_NOT_ALLOWED, error.to_string())
            }
            error @ (RelayError::MissingApiKey
            | RelayError::MessagesRequired
            | RelayError::InvalidBody) => envelope(StatusCode::BAD_REQUEST, error.to_string()),
        }
    }
}
