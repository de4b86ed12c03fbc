//! Submission write endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

use consensus_core::SubmissionRequest;

use crate::api::errors::ApiError;
use crate::server::ConsensusServer;

/// Handle `POST /submissions`
pub async fn create_submission(
    State(server): State<Arc<ConsensusServer>>,
    payload: Result<Json<SubmissionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    server.submission_service().submit(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Submission saved successfully" })),
    ))
}
