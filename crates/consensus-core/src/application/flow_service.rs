use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::{
    domain::flow::{FlowRecord, FlowRecordId, GroupId},
    domain::repository::FlowRepository,
    validation::require_param,
    ConsensusError, ConsensusResult,
};

/// Raw body of a flow submission
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowRequest {
    /// Flow document, as an object or as a JSON-encoded string
    #[serde(default)]
    pub flow: Option<Value>,

    /// Free-text description
    #[serde(default)]
    pub description: Option<String>,

    /// Group the diagram was drawn for
    #[serde(default)]
    pub group_id: Option<String>,

    /// Display name of the submitter
    #[serde(default)]
    pub user_name: Option<String>,

    /// Identifier of the submitter
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Service for free-form diagram records
pub struct FlowService {
    repo: Arc<dyn FlowRepository>,
}

impl FlowService {
    /// Create a new flow service
    pub fn new(repo: Arc<dyn FlowRepository>) -> Self {
        Self { repo }
    }

    /// Validate and store a flow document verbatim
    pub async fn submit(&self, request: FlowRequest) -> ConsensusResult<FlowRecord> {
        let group_id = require_param(request.group_id.as_deref(), "groupId")?;
        let flow = parse_flow(request.flow)?;

        let record = FlowRecord::new(
            GroupId(group_id.to_string()),
            request.description.unwrap_or_default(),
            flow,
            request.user_name,
            request.user_id,
        );
        self.repo.save(&record).await?;

        tracing::info!(
            flow_id = %record.id,
            group_id = %record.group_id,
            "Flow stored"
        );
        Ok(record)
    }

    /// All flows of a group in submission order
    pub async fn list_by_group(&self, group_id: Option<&str>) -> ConsensusResult<Vec<FlowRecord>> {
        let group_id = require_param(group_id, "groupId")?;
        let flows = self.repo.find_by_group(&GroupId(group_id.to_string())).await?;
        if flows.is_empty() {
            return Err(ConsensusError::NotFound(
                "No flows found for this group".to_string(),
            ));
        }
        Ok(flows)
    }

    /// Fetch one flow record
    pub async fn get(&self, id: &str) -> ConsensusResult<FlowRecord> {
        self.repo
            .find_by_id(&FlowRecordId(id.to_string()))
            .await?
            .ok_or_else(|| ConsensusError::NotFound(format!("Flow {} not found", id)))
    }
}

/// Accepts an object, or a string holding one, with a non-empty `nodes` array
fn parse_flow(flow: Option<Value>) -> ConsensusResult<Value> {
    let invalid = || ConsensusError::Validation("Invalid flow data provided.".to_string());

    let flow = match flow {
        Some(Value::String(raw)) => serde_json::from_str::<Value>(&raw).map_err(|_| invalid())?,
        Some(value) => value,
        None => return Err(invalid()),
    };

    let has_nodes = flow
        .get("nodes")
        .and_then(Value::as_array)
        .map(|nodes| !nodes.is_empty())
        .unwrap_or(false);
    if !flow.is_object() || !has_nodes {
        return Err(invalid());
    }
    Ok(flow)
}
