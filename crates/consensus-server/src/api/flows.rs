//! Free-form diagram endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use consensus_core::{FlowRecord, FlowRequest};

use crate::api::errors::ApiError;
use crate::server::ConsensusServer;

/// Query parameters for listing flows
#[derive(Debug, Default, Deserialize)]
pub struct GroupQuery {
    /// Group to list
    #[serde(rename = "groupId")]
    pub group_id: Option<String>,
}

/// Handle `POST /flows`
pub async fn create_flow(
    State(server): State<Arc<ConsensusServer>>,
    payload: Result<Json<FlowRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let record = server.flow_service().submit(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Flow saved successfully",
            "id": record.id,
        })),
    ))
}

/// Handle `GET /flows?groupId=`
pub async fn list_flows(
    State(server): State<Arc<ConsensusServer>>,
    query: Result<Query<GroupQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;
    let flows = server
        .flow_service()
        .list_by_group(query.group_id.as_deref())
        .await?;
    Ok(Json(json!({ "flows": flows })))
}

/// Handle `GET /flows/:id`
pub async fn get_flow(
    State(server): State<Arc<ConsensusServer>>,
    Path(id): Path<String>,
) -> Result<Json<FlowRecord>, ApiError> {
    let record = server.flow_service().get(&id).await?;
    Ok(Json(record))
}
