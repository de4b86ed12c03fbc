//! Read views over a session's submissions

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use consensus_core::{AggregatedView, AllNodeSubmissionsView, NodeSubmissionsView};

use crate::api::errors::ApiError;
use crate::server::ConsensusServer;

/// Query parameters naming a session
#[derive(Debug, Default, Deserialize)]
pub struct SessionQuery {
    /// Session to read
    #[serde(rename = "sessionID")]
    pub session_id: Option<String>,
}

/// Query parameters of the single-label view
#[derive(Debug, Default, Deserialize)]
pub struct NodeSubmissionsQuery {
    /// Session to read
    #[serde(rename = "sessionID")]
    pub session_id: Option<String>,
    /// Label to collect placements for
    #[serde(rename = "nodeLabel")]
    pub node_label: Option<String>,
}

/// Handle `GET /aggregated`
pub async fn get_aggregated(
    State(server): State<Arc<ConsensusServer>>,
    query: Result<Query<SessionQuery>, QueryRejection>,
) -> Result<Json<AggregatedView>, ApiError> {
    let Query(query) = query?;
    let view = server
        .query_service()
        .get_aggregated(query.session_id.as_deref())
        .await?;
    Ok(Json(view))
}

/// Handle `GET /node-submissions`
pub async fn get_node_submissions(
    State(server): State<Arc<ConsensusServer>>,
    query: Result<Query<NodeSubmissionsQuery>, QueryRejection>,
) -> Result<Json<NodeSubmissionsView>, ApiError> {
    let Query(query) = query?;
    let view = server
        .query_service()
        .get_node_submissions(query.session_id.as_deref(), query.node_label.as_deref())
        .await?;
    Ok(Json(view))
}

/// Handle `GET /all-node-submissions`
pub async fn get_all_node_submissions(
    State(server): State<Arc<ConsensusServer>>,
    query: Result<Query<SessionQuery>, QueryRejection>,
) -> Result<Json<AllNodeSubmissionsView>, ApiError> {
    let Query(query) = query?;
    let view = server
        .query_service()
        .get_all_node_submissions(query.session_id.as_deref())
        .await?;
    Ok(Json(view))
}
