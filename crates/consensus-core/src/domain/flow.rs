//! Free-form diagram format and its persisted record.
//!
//! The flow document is the serialized form of a [`GraphModel`]
//! including edges and viewport. Records wrap it as an opaque JSON value
//! and are returned exactly as they were written; nothing aggregates them.
//!
//! [`GraphModel`]: crate::domain::graph_model::GraphModel

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::submission::Position;

/// Pan/zoom state of the editing canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Horizontal pan
    pub x: f64,
    /// Vertical pan
    pub y: f64,
    /// Zoom factor
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

/// Full diagram: nodes with editor ids, edges and viewport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowDocument {
    /// Nodes keyed by editor id
    pub nodes: Vec<FlowNode>,
    /// Directed edges between editor ids
    pub edges: Vec<FlowEdge>,
    /// Canvas viewport at save time
    pub viewport: Viewport,
}

/// Node entry of a [`FlowDocument`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowNode {
    /// Editor id
    pub id: String,
    /// Display payload
    pub data: FlowNodeData,
    /// Canvas position
    pub position: Position,
}

/// Display payload of a [`FlowNode`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowNodeData {
    /// Node label
    pub label: String,
}

/// Edge entry of a [`FlowDocument`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowEdge {
    /// Editor id
    pub id: String,
    /// Source node id
    pub source: String,
    /// Target node id
    pub target: String,
}

/// Value object: Group ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub String);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Value object: Flow record ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlowRecordId(pub String);

impl fmt::Display for FlowRecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A submitted free-form diagram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowRecord {
    /// Server-assigned identifier
    pub id: FlowRecordId,
    /// Group the diagram was drawn for
    pub group_id: GroupId,
    /// Free-text description
    pub description: String,
    /// Opaque flow document as submitted
    pub flow: serde_json::Value,
    /// Display name of the submitter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    /// Identifier of the submitter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// When the record was accepted
    pub created_at: DateTime<Utc>,
}

impl FlowRecord {
    /// Create a new record with a fresh id
    pub fn new(
        group_id: GroupId,
        description: String,
        flow: serde_json::Value,
        user_name: Option<String>,
        user_id: Option<String>,
    ) -> Self {
        Self {
            id: FlowRecordId(Uuid::new_v4().to_string()),
            group_id,
            description,
            flow,
            user_name,
            user_id,
            created_at: Utc::now(),
        }
    }
}
