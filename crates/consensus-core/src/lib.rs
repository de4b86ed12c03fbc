//!
//! Consensus Core - graph editing model and aggregation engine
//!
//! This crate defines the domain models, the in-session graph editor,
//! the cross-submission aggregation engine and the application services
//! that sit between persisted submissions and the read views built on them.
//! It performs no I/O of its own; persistence is reached through the
//! repository traits in [`domain::repository`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Domain layer - core models, editor and aggregation rules
pub mod domain;

/// Application services - orchestration over repositories
pub mod application;

/// Error types
pub mod error;

/// Request parameter helpers shared by the services
pub mod validation;

// Re-export key types
pub use error::{ConsensusError, ConsensusResult};

pub use domain::aggregation::{
    aggregate, aggregate_with, AggregatedNode, AggregationConfig, AggregationEngine,
    DEFAULT_CANVAS_SCALE,
};
pub use domain::flow::{FlowDocument, FlowRecord, FlowRecordId, GroupId, Viewport};
pub use domain::graph_model::{
    ClickOutcome, Edge, EdgeId, EdgeStyle, EditorNode, GraphError, GraphModel, InteractionMode,
    NodeId,
};
pub use domain::labels::{LabelSet, DEFAULT_EXPECTED_LABELS};
pub use domain::repository::{FlowRepository, SubmissionRepository};
pub use domain::submission::{
    Node, Position, PositionedInstance, SessionId, Submission, SubmissionId,
};

pub use application::flow_service::{FlowRequest, FlowService};
pub use application::query_service::{
    AggregatedView, AllNodeSubmissionsView, NodeSubmissionsView, QueryService,
};
pub use application::submission_service::{SubmissionRequest, SubmissionService};
