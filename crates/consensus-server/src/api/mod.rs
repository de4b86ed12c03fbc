//! API module for the Consensus Server
//!
//! This module contains the API routes and handlers for the Consensus Server.

use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod errors;
pub mod flows;
pub mod health;
pub mod submissions;
pub mod views;

use crate::api::errors::ApiError;
use crate::server::ConsensusServer;

/// Build the router for API endpoints
pub fn build_router(server: Arc<ConsensusServer>) -> Router {
    Router::new()
        // Submission write
        .route("/submissions", post(submissions::create_submission))
        // Consensus views
        .route("/aggregated", get(views::get_aggregated))
        .route("/node-submissions", get(views::get_node_submissions))
        .route("/all-node-submissions", get(views::get_all_node_submissions))
        // Free-form diagrams
        .route("/flows", post(flows::create_flow).get(flows::list_flows))
        .route("/flows/:id", get(flows::get_flow))
        // Health check
        .route("/health", get(health::health_check))
        .fallback(route_not_found)
        .layer(TraceLayer::new_for_http())
        // Shared state
        .with_state(server)
}

async fn route_not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}
