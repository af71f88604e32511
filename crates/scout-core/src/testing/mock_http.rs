//! HTTP mocking for peer interactions.
//!
//! Provides an [`RpcTransport`] that intercepts requests and returns
//! predefined responses. Supports pattern matching, scripted response
//! sequences, simulated outages and request recording for verification.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde::Serialize;

use crate::error::{Result, ScoutError};
use crate::rpc::{BoxFuture, RpcTransport, TransportResponse};

/// Mock transport for testing.
#[derive(Clone)]
pub struct MockHttp {
    mocks: Arc<RwLock<Vec<MockHandler>>>,
    requests: Arc<RwLock<Vec<RecordedRequest>>>,
}

type Handler = Arc<dyn Fn(&MockRequest) -> MockResponse + Send + Sync>;

/// Responds to requests whose URL or path matches `pattern`.
struct MockHandler {
    pattern: String,
    handler: Handler,
}

/// A recorded request for verification.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Request URL.
    pub url: String,
    /// Request body.
    pub body: serde_json::Value,
}

impl RecordedRequest {
    /// JSON-RPC method named in the body.
    pub fn rpc_method(&self) -> Option<&str> {
        self.body.get("method").and_then(|m| m.as_str())
    }
}

/// Mock HTTP request.
#[derive(Debug, Clone)]
pub struct MockRequest {
    /// Request path.
    pub path: String,
    /// Request URL.
    pub url: String,
    /// Request body.
    pub body: serde_json::Value,
}

impl MockRequest {
    /// JSON-RPC method named in the body.
    pub fn rpc_method(&self) -> Option<&str> {
        self.body.get("method").and_then(|m| m.as_str())
    }
}

/// Mock HTTP response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// Status code.
    pub status: u16,
    /// Response body.
    pub body: serde_json::Value,
    /// Raw body sent instead of `body` when set.
    pub raw_body: Option<String>,
    /// Time the peer takes before answering.
    pub delay: Option<Duration>,
    /// Connection-level failure instead of a response.
    pub failure: Option<String>,
}

impl MockResponse {
    /// Create a successful JSON response.
    pub fn json<T: Serialize>(body: T) -> Self {
        Self {
            status: 200,
            body: serde_json::to_value(body).unwrap_or(serde_json::Value::Null),
            raw_body: None,
            delay: None,
            failure: None,
        }
    }

    /// Create a JSON-RPC success envelope around `result`.
    pub fn rpc_result<T: Serialize>(result: T) -> Self {
        let result = serde_json::to_value(result).unwrap_or(serde_json::Value::Null);
        Self::json(serde_json::json!({ "jsonrpc": "2.0", "id": 1, "result": result }))
    }

    /// Create an error response.
    pub fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            ..Self::json(serde_json::json!({ "error": message }))
        }
    }

    /// Create a response whose body is not JSON.
    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            body: serde_json::Value::Null,
            raw_body: Some(body.to_string()),
            delay: None,
            failure: None,
        }
    }

    /// Simulate a peer that refuses the connection.
    pub fn unreachable(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::error(0, message)
        }
    }

    /// Create an empty 200 OK response.
    pub fn ok() -> Self {
        Self::json(serde_json::json!({}))
    }

    /// Delay the response.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn body_bytes(&self) -> Vec<u8> {
        match &self.raw_body {
            Some(raw) => raw.clone().into_bytes(),
            None => serde_json::to_vec(&self.body).unwrap_or_default(),
        }
    }
}

impl MockHttp {
    /// Create a new mock transport.
    pub fn new() -> Self {
        Self {
            mocks: Arc::new(RwLock::new(Vec::new())),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Create a builder.
    pub fn builder() -> MockHttpBuilder {
        MockHttpBuilder::new()
    }

    /// Register a handler after construction. Earlier handlers win.
    pub fn add_mock<F>(&self, pattern: &str, handler: F)
    where
        F: Fn(&MockRequest) -> MockResponse + Send + Sync + 'static,
    {
        self.mocks.write().unwrap().push(MockHandler {
            pattern: pattern.to_string(),
            handler: Arc::new(handler),
        });
    }

    /// Record `request` and answer it with the first matching handler.
    fn respond(&self, request: &MockRequest) -> MockResponse {
        self.requests.write().unwrap().push(RecordedRequest {
            url: request.url.clone(),
            body: request.body.clone(),
        });

        let mocks = self.mocks.read().unwrap();
        for mock in mocks.iter() {
            if self.matches_pattern(&request.url, &mock.pattern)
                || self.matches_pattern(&request.path, &mock.pattern)
            {
                return (mock.handler)(request);
            }
        }

        // Unknown peers behave like unreachable hosts.
        MockResponse::unreachable(&format!("No mock found for {}", request.url))
    }

    /// Check if a URL matches a pattern.
    fn matches_pattern(&self, url: &str, pattern: &str) -> bool {
        let pattern_parts: Vec<&str> = pattern.split('*').collect();
        if pattern_parts.len() == 1 {
            return url == pattern;
        }

        let mut remaining = url;
        for (i, part) in pattern_parts.iter().enumerate() {
            if part.is_empty() {
                continue;
            }

            if i == 0 {
                if !remaining.starts_with(part) {
                    return false;
                }
                remaining = &remaining[part.len()..];
            } else if i == pattern_parts.len() - 1 {
                if !remaining.ends_with(part) {
                    return false;
                }
            } else if let Some(pos) = remaining.find(part) {
                remaining = &remaining[pos + part.len()..];
            } else {
                return false;
            }
        }

        true
    }

    /// Get recorded requests.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.read().unwrap().clone()
    }

    /// Get requests matching a pattern.
    pub fn requests_to(&self, pattern: &str) -> Vec<RecordedRequest> {
        self.requests
            .read()
            .unwrap()
            .iter()
            .filter(|r| self.matches_pattern(&r.url, pattern))
            .cloned()
            .collect()
    }

    // =========================================================================
    // VERIFICATION METHODS
    // =========================================================================

    /// Assert that a URL pattern was called.
    pub fn assert_called(&self, pattern: &str) {
        let requests = self.requests();
        let matching = requests
            .iter()
            .filter(|r| self.matches_pattern(&r.url, pattern))
            .count();
        assert!(
            matching > 0,
            "Expected HTTP call matching '{}', but none found. Recorded requests: {:?}",
            pattern,
            requests.iter().map(|r| &r.url).collect::<Vec<_>>()
        );
    }

    /// Assert that a URL pattern was called a specific number of times.
    pub fn assert_called_times(&self, pattern: &str, expected: usize) {
        let matching = self.requests_to(pattern).len();
        assert_eq!(
            matching, expected,
            "Expected {} HTTP calls matching '{}', but found {}",
            expected, pattern, matching
        );
    }

    /// Assert that a URL pattern was not called.
    pub fn assert_not_called(&self, pattern: &str) {
        self.assert_called_times(pattern, 0);
    }

    /// Assert that a JSON-RPC method was sent to a URL pattern `expected` times.
    pub fn assert_method_called_times(&self, pattern: &str, method: &str, expected: usize) {
        let matching = self
            .requests_to(pattern)
            .iter()
            .filter(|r| r.rpc_method() == Some(method))
            .count();
        assert_eq!(
            matching, expected,
            "Expected {} '{}' calls matching '{}', but found {}",
            expected, method, pattern, matching
        );
    }
}

impl Default for MockHttp {
    fn default() -> Self {
        Self::new()
    }
}

impl RpcTransport for MockHttp {
    fn post_json<'a>(
        &'a self,
        url: &'a str,
        body: &'a serde_json::Value,
        timeout: Duration,
    ) -> BoxFuture<'a, Result<TransportResponse>> {
        Box::pin(async move {
            let request = MockRequest {
                path: path_of(url).to_string(),
                url: url.to_string(),
                body: body.clone(),
            };
            let response = self.respond(&request);

            if let Some(delay) = response.delay {
                if delay >= timeout {
                    tokio::time::sleep(timeout).await;
                    return Err(ScoutError::Timeout(format!(
                        "{} did not answer within {:?}",
                        url, timeout
                    )));
                }
                tokio::time::sleep(delay).await;
            }

            if let Some(message) = response.failure {
                return Err(ScoutError::Transport(message));
            }

            Ok(TransportResponse {
                status: response.status,
                body: response.body_bytes(),
            })
        })
    }
}

fn path_of(url: &str) -> &str {
    let without_scheme = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    match without_scheme.find('/') {
        Some(pos) => &without_scheme[pos..],
        None => "/",
    }
}

/// Builder for MockHttp.
pub struct MockHttpBuilder {
    mocks: Vec<MockHandler>,
}

impl MockHttpBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self { mocks: Vec::new() }
    }

    /// Add a mock with a custom handler.
    pub fn mock<F>(mut self, pattern: &str, handler: F) -> Self
    where
        F: Fn(&MockRequest) -> MockResponse + Send + Sync + 'static,
    {
        self.mocks.push(MockHandler {
            pattern: pattern.to_string(),
            handler: Arc::new(handler),
        });
        self
    }

    /// Add a mock that returns a JSON response.
    pub fn mock_json<T: Serialize + Clone + Send + Sync + 'static>(
        self,
        pattern: &str,
        response: T,
    ) -> Self {
        self.mock(pattern, move |_| MockResponse::json(response.clone()))
    }

    /// Answer each call with the next response in `responses`, repeating the last one.
    pub fn sequence(self, pattern: &str, responses: Vec<MockResponse>) -> Self {
        let calls = AtomicUsize::new(0);
        self.mock(pattern, move |_| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            responses
                .get(n)
                .or_else(|| responses.last())
                .cloned()
                .unwrap_or_else(|| MockResponse::unreachable("empty sequence"))
        })
    }

    /// Script a peer: `getClusterNodes` returns `nodes`, `getSlot` answers 200.
    pub fn cluster_nodes(self, pattern: &str, nodes: serde_json::Value) -> Self {
        self.mock(pattern, move |req| match req.rpc_method() {
            Some("getClusterNodes") => MockResponse::rpc_result(nodes.clone()),
            _ => MockResponse::rpc_result(serde_json::json!(1)),
        })
    }

    /// Script a live peer that only answers `getSlot`.
    pub fn alive(self, pattern: &str) -> Self {
        self.mock(pattern, |_| MockResponse::rpc_result(serde_json::json!(1)))
    }

    /// Script an unreachable peer.
    pub fn unreachable(self, pattern: &str) -> Self {
        self.mock(pattern, |_| MockResponse::unreachable("connection refused"))
    }

    /// Build the MockHttp.
    pub fn build(self) -> MockHttp {
        MockHttp {
            mocks: Arc::new(RwLock::new(self.mocks)),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl Default for MockHttpBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_response_json() {
        let response = MockResponse::json(serde_json::json!({"id": 123}));
        assert_eq!(response.status, 200);
        assert_eq!(response.body["id"], 123);
    }

    #[test]
    fn test_pattern_matching() {
        let mock = MockHttp::new();

        assert!(mock.matches_pattern("http://10.0.0.1:8899", "http://10.0.0.1:8899"));
        assert!(mock.matches_pattern("http://10.0.0.1:8899", "http://10.0.0.1:*"));
        assert!(mock.matches_pattern("http://10.0.0.1:8899", "*:8899"));
        assert!(!mock.matches_pattern("http://10.0.0.2:8899", "http://10.0.0.1:*"));
    }

    #[test]
    fn test_path_of() {
        assert_eq!(path_of("http://10.0.0.1:8899"), "/");
        assert_eq!(path_of("https://api.example.com/rpc"), "/rpc");
    }

    #[tokio::test]
    async fn test_transport_success_and_recording() {
        let mock = MockHttp::builder()
            .cluster_nodes("http://10.0.0.1:*", serde_json::json!([{"pubkey": "a"}]))
            .build();

        let body = serde_json::json!({"jsonrpc": "2.0", "id": 1, "method": "getClusterNodes"});
        let response = mock
            .post_json("http://10.0.0.1:8899", &body, Duration::from_secs(1))
            .await
            .unwrap();

        assert!(response.is_ok());
        let decoded: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(decoded["result"][0]["pubkey"], "a");
        mock.assert_method_called_times("http://10.0.0.1:*", "getClusterNodes", 1);
    }

    #[tokio::test]
    async fn test_unknown_peer_is_unreachable() {
        let mock = MockHttp::new();
        let result = mock
            .post_json("http://10.9.9.9:8899", &serde_json::Value::Null, Duration::from_secs(1))
            .await;
        assert!(matches!(result, Err(ScoutError::Transport(_))));
        mock.assert_called("http://10.9.9.9:*");
    }

    #[tokio::test]
    async fn test_delay_past_timeout() {
        let mock = MockHttp::builder()
            .mock("*", |_| MockResponse::ok().with_delay(Duration::from_millis(200)))
            .build();
        let result = mock
            .post_json("http://slow:8899", &serde_json::Value::Null, Duration::from_millis(20))
            .await;
        assert!(matches!(result, Err(ScoutError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_sequence_repeats_last() {
        let mock = MockHttp::builder()
            .sequence(
                "*",
                vec![MockResponse::unreachable("down"), MockResponse::ok()],
            )
            .build();
        let body = serde_json::Value::Null;
        let timeout = Duration::from_secs(1);

        assert!(mock.post_json("http://p", &body, timeout).await.is_err());
        assert!(mock.post_json("http://p", &body, timeout).await.is_ok());
        assert!(mock.post_json("http://p", &body, timeout).await.is_ok());
        mock.assert_called_times("http://p", 3);
    }

    #[tokio::test]
    async fn test_add_mock_after_build() {
        let mock = MockHttp::new();
        mock.add_mock("http://late:*", |_| MockResponse::ok());

        let response = mock
            .post_json("http://late:8899", &serde_json::Value::Null, Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn test_text_body() {
        let mock = MockHttp::builder()
            .mock("*", |_| MockResponse::text(502, "bad gateway"))
            .build();
        let response = mock
            .post_json("http://p", &serde_json::Value::Null, Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(response.status, 502);
        assert_eq!(response.body, b"bad gateway");
    }
}
