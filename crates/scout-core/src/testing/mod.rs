//! Testing utilities for the discovery pipeline.
//!
//! Enabled with the `testing` feature. [`MockHttp`] stands in for the real
//! HTTP client so fetcher, probe and orchestrator tests can script peers that
//! answer, fail, stall or return garbage, and then verify exactly which
//! requests were made.
//!
//! # Example
//!
//! ```ignore
//! let mock = MockHttp::builder()
//!     .cluster_nodes("http://10.0.0.1:8899", json!([{"pubkey": "a", "rpc": "10.0.0.2:8899"}]))
//!     .mock("http://10.0.0.2:8899", |_| MockResponse::json(json!({"result": 42})))
//!     .build();
//! ```

pub mod mock_http;

pub use mock_http::{MockHttp, MockHttpBuilder, MockRequest, MockResponse, RecordedRequest};
