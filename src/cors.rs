//! CORS response decoration.
//!
//! Every response the relay produces, including preflight responses and error
//! envelopes, carries the same fixed CORS header set. The allowed origin is
//! configurable; the source deployment pins it to the hosting site, the
//! default is the wildcard. This is hand-rolled rather than tower-http's
//! `CorsLayer` because that layer rejects the `Allow-Credentials: true` plus
//! wildcard-origin combination the original contract specifies.
use axum::http::{HeaderMap, HeaderValue, header};

pub const ALLOW_METHODS: &str = "GET,OPTIONS,PATCH,DELETE,POST,PUT";
pub const ALLOW_HEADERS: &str = "X-CSRF-Token, X-Requested-With, Accept, Accept-Version, \
     Content-Length, Content-MD5, Content-Type, Date, X-Api-Version, x-api-key, \
     anthropic-version";

/// Inserts the CORS header set, overwriting anything already present.
pub fn apply(headers: &mut HeaderMap, allow_origin: &HeaderValue) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin.clone());
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_full_header_set() {
        let mut headers = HeaderMap::new();
        apply(&mut headers, &HeaderValue::from_static("*"));

        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
            "true"
        );
        assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_METHODS).unwrap(),
            ALLOW_METHODS
        );
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_HEADERS).unwrap(),
            ALLOW_HEADERS
        );
    }

    #[test]
    fn configured_origin_overwrites_existing() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        );

        apply(
            &mut headers,
            &HeaderValue::from_static("https://app.example.com"),
        );

        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://app.example.com"
        );
    }
}
