//! HTTP session shared by every call of one client.
//!
//! The session carries the default headers; each request sets its own
//! timeout from the client configuration.

use crate::error::CollectionError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Header carrying the client version on every request.
pub const VERSION_HEADER: &str = "x-pyfunceble-version";

/// Build the HTTP session for a client.
///
/// `Authorization: Bearer <token>` is only sent when `token` is non-empty.
///
/// # Errors
///
/// Returns `InvalidValue` when the token cannot be sent as a header value,
/// and `NetworkError` when the underlying client cannot be created.
pub fn build_session(token: &str) -> Result<Client, CollectionError> {
    let mut headers = HeaderMap::new();

    if !token.is_empty() {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
            CollectionError::invalid_value("token", "contains characters not allowed in a header")
        })?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    headers.insert(
        HeaderName::from_static(VERSION_HEADER),
        HeaderValue::from_static(crate::VERSION),
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    Client::builder()
        .default_headers(headers)
        .build()
        .map_err(|e| {
            CollectionError::network_with_source(
                "Failed to create collection HTTP client",
                e.to_string(),
            )
        })
}

/// POST `body` as JSON and return the parsed JSON response.
///
/// Anything but HTTP 200 with a JSON body is an error; callers decide
/// whether that error is fatal.
pub async fn post_json(
    session: &Client,
    url: &str,
    body: &serde_json::Value,
    timeout: Duration,
) -> Result<serde_json::Value, CollectionError> {
    let response = session
        .post(url)
        .json(body)
        .timeout(timeout)
        .send()
        .await?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(CollectionError::network(format!(
            "HTTP {} from {}",
            status, url
        )));
    }

    let text = response.text().await?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    #[tokio::test]
    async fn test_session_sends_default_headers() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/echo"))
            .and(header("authorization", "Bearer secret"))
            .and(header("content-type", "application/json"))
            .and(header(VERSION_HEADER, crate::VERSION))
            .and(body_json(json!({"subject": "example.org"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let session = build_session("secret").unwrap();
        let url = format!("{}/echo", mock_server.uri());
        let result = post_json(
            &session,
            &url,
            &json!({"subject": "example.org"}),
            Duration::from_secs(5),
        )
        .await
        .unwrap();

        assert_eq!(result, json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_anonymous_session_has_no_authorization() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&mock_server)
            .await;

        let session = build_session("").unwrap();
        let result = post_json(&session, &mock_server.uri(), &json!({}), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(result, json!([]));

        let requests: Vec<Request> = mock_server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(!requests[0].headers.contains_key("authorization"));
    }

    #[tokio::test]
    async fn test_non_200_is_an_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"created": true})))
            .mount(&mock_server)
            .await;

        let session = build_session("secret").unwrap();
        let result =
            post_json(&session, &mock_server.uri(), &json!({}), Duration::from_secs(5)).await;
        assert!(matches!(result, Err(CollectionError::NetworkError { .. })));
    }

    #[tokio::test]
    async fn test_invalid_json_is_a_parse_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let session = build_session("secret").unwrap();
        let result =
            post_json(&session, &mock_server.uri(), &json!({}), Duration::from_secs(5)).await;
        assert!(matches!(result, Err(CollectionError::ParseError { .. })));
    }

    #[test]
    fn test_token_with_newline_is_rejected() {
        let err = build_session("bad\ntoken").unwrap_err();
        assert!(err.is_input_error());
    }
}
