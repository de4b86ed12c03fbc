use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::{
    domain::labels::LabelSet,
    domain::repository::SubmissionRepository,
    domain::submission::{Node, SessionId, Submission, SubmissionId},
    validation::require_param,
    ConsensusError, ConsensusResult,
};

/// Raw body of a submission write.
///
/// Fields stay loosely typed so that shape errors surface as validation
/// errors with a stable message rather than as deserialization failures.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmissionRequest {
    /// Session the submission belongs to
    #[serde(rename = "sessionID", default)]
    pub session_id: Option<String>,

    /// Client-chosen submission identifier
    #[serde(rename = "submissionID", default)]
    pub submission_id: Option<String>,

    /// Node list, expected to be a JSON array
    #[serde(default)]
    pub nodes: Option<Value>,
}

/// Write side: validates and appends submissions
pub struct SubmissionService {
    repo: Arc<dyn SubmissionRepository>,
    labels: LabelSet,
    strict_labels: bool,
}

impl SubmissionService {
    /// Create a new submission service.
    ///
    /// With `strict_labels` set, submissions naming a label outside
    /// `labels` are rejected instead of stored.
    pub fn new(repo: Arc<dyn SubmissionRepository>, labels: LabelSet, strict_labels: bool) -> Self {
        Self {
            repo,
            labels,
            strict_labels,
        }
    }

    /// Validate a request and append it to the store
    pub async fn submit(&self, request: SubmissionRequest) -> ConsensusResult<Submission> {
        let nodes = parse_nodes(request.nodes)?;
        let session_id = require_param(request.session_id.as_deref(), "sessionID")?;
        let submission_id = require_param(request.submission_id.as_deref(), "submissionID")?;

        if self.strict_labels {
            if let Some(node) = nodes.iter().find(|n| !self.labels.contains(&n.label)) {
                return Err(ConsensusError::Validation(format!(
                    "Unexpected node label: {}",
                    node.label
                )));
            }
        }

        let submission = Submission::new(
            SessionId::from(session_id),
            SubmissionId::from(submission_id),
            nodes,
        );
        self.repo.save(&submission).await?;

        tracing::info!(
            session_id = %submission.session_id,
            submission_id = %submission.submission_id,
            nodes = submission.nodes.len(),
            "Submission stored"
        );
        Ok(submission)
    }
}

fn parse_nodes(nodes: Option<Value>) -> ConsensusResult<Vec<Node>> {
    match nodes {
        Some(value @ Value::Array(_)) => serde_json::from_value(value)
            .map_err(|_| ConsensusError::Validation("Invalid node data provided.".to_string())),
        _ => Err(ConsensusError::Validation(
            "Invalid node data provided.".to_string(),
        )),
    }
}
