//! Health check endpoint for the Consensus Server

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use crate::server::ConsensusServer;

/// Health check handler
///
/// Reports liveness together with the label vocabulary the server
/// aggregates over, so clients can render the right palette.
pub async fn health_check(State(server): State<Arc<ConsensusServer>>) -> impl IntoResponse {
    debug!("Health check requested");

    Json(json!({
        "status": "UP",
        "version": env!("CARGO_PKG_VERSION"),
        "expectedLabels": server.query_service().labels(),
    }))
}
