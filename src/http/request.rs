//! Inbound request inspection.
//!
//! # Responsibilities
//! - Detect WebSocket upgrade requests
//! - Rebuild the absolute request URL
//! - Fold headers into a name → value mapping
//! - Read the body once and decode it into a [`RequestSnapshot`]

use std::collections::BTreeMap;

use axum::body::Body;
use axum::http::{header, HeaderMap, Request, Uri};

use crate::relay::{RelayError, RelayResult, RequestSnapshot};

/// True when the request asks to upgrade to a WebSocket.
pub fn is_websocket_upgrade(headers: &HeaderMap) -> bool {
    headers
        .get(header::UPGRADE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("websocket"))
}

/// One entry per header name, repeated values joined with `", "`.
pub fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .keys()
        .map(|name| {
            let value = headers
                .get_all(name)
                .iter()
                .map(|v| String::from_utf8_lossy(v.as_bytes()))
                .collect::<Vec<_>>()
                .join(", ");
            (name.as_str().to_string(), value)
        })
        .collect()
}

/// The URL the caller used, as `{scheme}://{host}{path}?{query}`.
pub fn absolute_url(headers: &HeaderMap, uri: &Uri, fallback_host: &str) -> String {
    if uri.scheme().is_some() && uri.authority().is_some() {
        return uri.to_string();
    }

    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| uri.authority().map(|a| a.as_str()))
        .unwrap_or(fallback_host);
    let path = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");

    format!("{}://{}{}", scheme, host, path)
}

/// Consume the request and decode it.
///
/// Fails only if the body cannot be read, including when it exceeds
/// `max_body_size`.
pub async fn read_snapshot(
    request: Request<Body>,
    max_body_size: usize,
    fallback_host: &str,
) -> RelayResult<RequestSnapshot> {
    let (parts, body) = request.into_parts();
    let url = absolute_url(&parts.headers, &parts.uri, fallback_host);
    let headers = collect_headers(&parts.headers);

    let bytes = axum::body::to_bytes(body, max_body_size)
        .await
        .map_err(|e| RelayError::BodyRead(e.to_string()))?;

    Ok(RequestSnapshot::new(parts.method.as_str(), url, headers, &bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::RequestBody;
    use axum::http::HeaderValue;

    #[test]
    fn test_upgrade_detection() {
        let mut headers = HeaderMap::new();
        assert!(!is_websocket_upgrade(&headers));

        headers.insert(header::UPGRADE, HeaderValue::from_static("h2c"));
        assert!(!is_websocket_upgrade(&headers));

        headers.insert(header::UPGRADE, HeaderValue::from_static("WebSocket"));
        assert!(is_websocket_upgrade(&headers));
    }

    #[test]
    fn test_repeated_headers_merge() {
        let mut headers = HeaderMap::new();
        headers.append("x-tag", HeaderValue::from_static("a"));
        headers.append("x-tag", HeaderValue::from_static("b"));
        headers.insert("accept", HeaderValue::from_static("*/*"));

        let collected = collect_headers(&headers);
        assert_eq!(collected.len(), 2);
        assert_eq!(collected["x-tag"], "a, b");
        assert_eq!(collected.keys().collect::<Vec<_>>(), ["accept", "x-tag"]);
    }

    #[test]
    fn test_absolute_url() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("relay.example"));
        let uri: Uri = "/hooks/a?x=1".parse().unwrap();
        assert_eq!(
            absolute_url(&headers, &uri, "0.0.0.0:8080"),
            "http://relay.example/hooks/a?x=1"
        );

        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        assert_eq!(
            absolute_url(&headers, &uri, "0.0.0.0:8080"),
            "https://relay.example/hooks/a?x=1"
        );

        let bare: Uri = "/".parse().unwrap();
        assert_eq!(absolute_url(&HeaderMap::new(), &bare, "0.0.0.0:8080"), "http://0.0.0.0:8080/");
    }

    #[tokio::test]
    async fn test_read_snapshot() {
        let request = Request::builder()
            .method("PUT")
            .uri("/items/7")
            .header(header::HOST, "relay.example")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"id":7}"#))
            .unwrap();

        let snapshot = read_snapshot(request, 1024, "unused").await.unwrap();
        assert_eq!(snapshot.method, "PUT");
        assert_eq!(snapshot.url, "http://relay.example/items/7");
        assert_eq!(snapshot.content_type, "application/json");
        assert_eq!(snapshot.body, RequestBody::Json(serde_json::json!({"id": 7})));
    }

    #[tokio::test]
    async fn test_oversized_body_fails_read() {
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from(vec![b'a'; 64]))
            .unwrap();

        let err = read_snapshot(request, 16, "relay").await.unwrap_err();
        assert!(matches!(err, RelayError::BodyRead(_)));
    }
}
