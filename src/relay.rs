//! The relay handler: one inbound request, at most one outbound request.
//!
//! Preflight probes are answered directly, the method gate rejects anything
//! that is not a POST, the body is validated, and the completion request is
//! forwarded to the upstream with the caller's key. Whatever comes back is
//! relayed: success payloads untouched, upstream errors with their status
//! mirrored, and any unexpected fault contained as a 500 envelope.
use crate::AppState;
use crate::client::HttpClient;
use crate::errors::RelayError;
use crate::models::ChatRequest;
use axum::{
    extract::State,
    http::{Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use tracing::{debug, error, info, instrument};

/// Header carrying the caller-supplied key to the upstream.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Fixed API version marker sent with every upstream call.
pub const ANTHROPIC_VERSION_HEADER: &str = "anthropic-version";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

const UPSTREAM_ERROR_FALLBACK: &str = "Error from Anthropic API";

#[instrument(skip(state, req))]
pub async fn relay_handler<T: HttpClient>(
    State(state): State<AppState<T>>,
    req: axum::extract::Request,
) -> Result<Response, RelayError> {
    // Preflight: the CORS layer decorates this like every other response.
    if req.method() == Method::OPTIONS {
        return Ok(StatusCode::OK.into_response());
    }

    if req.method() != Method::POST {
        return Err(RelayError::MethodNotAllowed);
    }

    let body_bytes = axum::body::to_bytes(req.into_body(), usize::MAX)
        .await
        .map_err(|_| RelayError::InvalidBody)?;
    debug!("Received request body of size: {}", body_bytes.len());

    let chat: ChatRequest =
        serde_json::from_slice(&body_bytes).map_err(|_| RelayError::InvalidBody)?;
    let (api_key, upstream_body) = chat.validate()?;

    info!("Forwarding completion request for model: {}", upstream_body.model);

    let upstream_req = build_upstream_request(&state, &api_key, &upstream_body)?;

    let response = match state.http_client.request(upstream_req).await {
        Ok(response) => response,
        Err(e) => {
            error!(
                "Error forwarding request to upstream {}: {}",
                state.settings.upstream, e
            );
            return Err(RelayError::Internal(e.to_string()));
        }
    };

    let status = response.status();
    let data_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .map_err(|e| RelayError::Internal(e.to_string()))?;
    debug!(%status, "Upstream responded with {} body bytes", data_bytes.len());

    if !status.is_success() {
        return Err(RelayError::Upstream {
            status,
            error: extract_upstream_error(&data_bytes),
        });
    }

    // Confirm the payload is JSON before relaying it untouched. A mangled
    // body from the upstream surfaces as a contained 500 rather than being
    // passed along.
    if let Err(e) = serde_json::from_slice::<Value>(&data_bytes) {
        return Err(RelayError::Internal(e.to_string()));
    }

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        data_bytes,
    )
        .into_response())
}

fn build_upstream_request<T: HttpClient>(
    state: &AppState<T>,
    api_key: &str,
    body: &crate::models::MessagesRequest,
) -> Result<axum::extract::Request, RelayError> {
    let upstream = &state.settings.upstream;

    // Set the host header explicitly to match the upstream. CDN fronts
    // reject requests where it disagrees with the URL.
    let host = match (upstream.host_str(), upstream.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        (None, _) => return Err(RelayError::Internal(format!("upstream URL has no host: {upstream}"))),
    };

    let serialized =
        serde_json::to_vec(body).map_err(|e| RelayError::Internal(e.to_string()))?;

    axum::http::Request::builder()
        .method(Method::POST)
        .uri(upstream.as_str())
        .header(header::HOST, host)
        .header(header::CONTENT_TYPE, "application/json")
        .header(API_KEY_HEADER, api_key)
        .header(ANTHROPIC_VERSION_HEADER, ANTHROPIC_VERSION)
        .body(axum::body::Body::from(serialized))
        .map_err(|e| RelayError::Internal(e.to_string()))
}

/// Pulls the `error` object out of an upstream failure body, falling back to
/// a generic message when the body is not JSON or carries no error key.
fn extract_upstream_error(body: &[u8]) -> Value {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|mut data| data.get_mut("error").map(Value::take))
        .filter(|error| !error.is_null())
        .unwrap_or_else(|| json!({ "message": UPSTREAM_ERROR_FALLBACK }))
}
