//! Builders for test data.

use consensus_core::{Node, Position, SessionId, Submission, SubmissionId};
use serde_json::{json, Value};

/// Fluent builder for [`Submission`]s and their request bodies
#[derive(Debug, Clone)]
pub struct SubmissionBuilder {
    session_id: String,
    submission_id: String,
    nodes: Vec<Node>,
}

impl SubmissionBuilder {
    /// Start a submission for `session_id`
    pub fn new(session_id: impl Into<String>, submission_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            submission_id: submission_id.into(),
            nodes: Vec::new(),
        }
    }

    /// Place a label
    pub fn node(mut self, label: impl Into<String>, x: f64, y: f64) -> Self {
        self.nodes.push(Node::new(label, Position::new(x, y)));
        self
    }

    /// Build the domain value
    pub fn build(self) -> Submission {
        Submission::new(
            SessionId(self.session_id),
            SubmissionId(self.submission_id),
            self.nodes,
        )
    }

    /// Build the `POST /submissions` body
    pub fn to_request_body(&self) -> Value {
        json!({
            "sessionID": self.session_id,
            "submissionID": self.submission_id,
            "nodes": self.nodes,
        })
    }
}
