//! Claude Relay - a small CORS-injecting proxy for the Anthropic Messages API
//!
//! Browser clients can't call the Anthropic API directly (no CORS, and no
//! place to keep a key out of page scripts), so they POST here instead. The
//! relay validates the request shape, forwards it upstream with the caller's
//! key, and passes the result back with CORS headers on every response.

use axum::Router;
use axum::http::HeaderValue;
use axum::response::Response;
use axum::routing::any;
use tracing::{info, instrument};
use url::Url;

pub mod client;
pub mod cors;
pub mod errors;
pub mod models;
pub mod relay;

use client::{HttpClient, HyperClient};
use relay::relay_handler;

/// The production upstream endpoint.
pub const ANTHROPIC_MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";

/// Where to forward requests and which origin to allow.
#[derive(Clone, Debug)]
pub struct RelaySettings {
    pub upstream: Url,
    pub allow_origin: HeaderValue,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            upstream: Url::parse(ANTHROPIC_MESSAGES_URL).expect("static upstream URL parses"),
            allow_origin: HeaderValue::from_static("*"),
        }
    }
}

/// The main application state containing the HTTP client and relay settings
#[derive(Clone, Debug)]
pub struct AppState<T: HttpClient> {
    pub http_client: T,
    pub settings: RelaySettings,
}

impl AppState<HyperClient> {
    /// Create a new AppState with the default Hyper client
    pub fn new(settings: RelaySettings) -> Self {
        let http_client = client::create_hyper_client(
            client::DEFAULT_POOL_MAX_IDLE_PER_HOST,
            client::DEFAULT_POOL_IDLE_TIMEOUT,
        );
        Self {
            http_client,
            settings,
        }
    }
}

impl<T: HttpClient> AppState<T> {
    /// Create a new AppState with a custom HTTP client (useful for testing)
    pub fn with_client(settings: RelaySettings, http_client: T) -> Self {
        Self {
            http_client,
            settings,
        }
    }
}

/// Build the relay router: a single `/api/claude` route, bound for all
/// methods so the handler can answer preflights and reject non-POSTs itself,
/// wrapped in a layer that stamps CORS headers onto every response.
#[instrument(skip(state))]
pub fn build_router<T: HttpClient + Clone + Send + Sync + 'static>(state: AppState<T>) -> Router {
    info!("Building router");
    let allow_origin = state.settings.allow_origin.clone();
    Router::new()
        .route("/api/claude", any(relay_handler))
        .with_state(state)
        .layer(axum::middleware::map_response(
            move |mut response: Response| {
                let allow_origin = allow_origin.clone();
                async move {
                    cors::apply(response.headers_mut(), &allow_origin);
                    response
                }
            },
        ))
}

/// Mock HTTP client used by the unit and integration test suites.
pub mod test_utils {
    use super::*;
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use std::sync::{Arc, Mutex};

    type ResponseBuilder = Arc<dyn Fn() -> Result<axum::response::Response, String> + Send + Sync>;

    pub struct MockHttpClient {
        pub requests: Arc<Mutex<Vec<MockRequest>>>,
        response_builder: ResponseBuilder,
    }

    #[derive(Debug, Clone)]
    pub struct MockRequest {
        pub method: String,
        pub uri: String,
        pub headers: Vec<(String, String)>,
        pub body: Vec<u8>,
    }

    impl MockHttpClient {
        /// Answers every request with the given status and body.
        pub fn new(status: StatusCode, body: &str) -> Self {
            let body = body.to_string();
            Self {
                requests: Arc::new(Mutex::new(Vec::new())),
                response_builder: Arc::new(move || {
                    Ok(axum::response::Response::builder()
                        .status(status)
                        .body(axum::body::Body::from(body.clone()))
                        .unwrap())
                }),
            }
        }

        /// Fails every request, simulating a network fault.
        pub fn failing(message: &str) -> Self {
            let message = message.to_string();
            Self {
                requests: Arc::new(Mutex::new(Vec::new())),
                response_builder: Arc::new(move || Err(message.clone())),
            }
        }

        pub fn get_requests(&self) -> Vec<MockRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl std::fmt::Debug for MockHttpClient {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("MockHttpClient")
                .field("requests", &self.requests)
                .field("response_builder", &"<closure>")
                .finish()
        }
    }

    impl Clone for MockHttpClient {
        fn clone(&self) -> Self {
            Self {
                requests: Arc::clone(&self.requests),
                response_builder: Arc::clone(&self.response_builder),
            }
        }
    }

    #[async_trait]
    impl HttpClient for MockHttpClient {
        async fn request(
            &self,
            req: axum::extract::Request,
        ) -> Result<axum::response::Response, Box<dyn std::error::Error + Send + Sync>> {
            let method = req.method().to_string();
            let uri = req.uri().to_string();
            let headers = req
                .headers()
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
                .collect();

            let body = axum::body::to_bytes(req.into_body(), usize::MAX)
                .await
                .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?
                .to_vec();

            self.requests.lock().unwrap().push(MockRequest {
                method,
                uri,
                headers,
                body,
            });

            (self.response_builder)().map_err(Into::into)
        }
    }
}
