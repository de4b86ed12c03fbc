//! Shared helpers for driving the router in-process.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use consensus_core::{FlowRepository, SubmissionRepository};
use consensus_server::{ConsensusServer, ServerConfig};
use consensus_state_inmemory::InMemoryStoreProvider;
use consensus_test_utils::e2e_labels;

/// Router over fresh in-memory stores
pub fn test_router(config: ServerConfig) -> Router {
    let (submission_repo, flow_repo) = InMemoryStoreProvider::new().create_repositories();
    router_with(config, submission_repo, flow_repo)
}

/// Router over a provider's stores
pub fn router_for(config: ServerConfig, provider: &InMemoryStoreProvider) -> Router {
    let (submission_repo, flow_repo) = provider.create_repositories();
    router_with(config, submission_repo, flow_repo)
}

/// Router over arbitrary stores
pub fn router_with(
    config: ServerConfig,
    submission_repo: Arc<dyn SubmissionRepository>,
    flow_repo: Arc<dyn FlowRepository>,
) -> Router {
    ConsensusServer::new(config, submission_repo, flow_repo).router()
}

/// Configuration using the two-label example vocabulary
pub fn e2e_config() -> ServerConfig {
    ServerConfig {
        expected_labels: e2e_labels().iter().map(String::from).collect(),
        ..ServerConfig::default()
    }
}

/// Send a request and decode the JSON response
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

/// GET request
pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// POST request with a JSON body
pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    post_raw(uri, body.to_string())
}

/// POST request with a raw JSON-typed body
pub fn post_raw(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}
