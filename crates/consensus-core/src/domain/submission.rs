use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A point on the editing canvas, in canvas units.
///
/// Coordinates are unbounded; negative and out-of-canvas values are valid.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate (grows downwards)
    pub y: f64,
}

impl Position {
    /// Create a new position
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A labeled placement as persisted inside a submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Label from the activity's vocabulary
    pub label: String,
    /// Where the user put it
    pub position: Position,
}

impl Node {
    /// Create a new node
    pub fn new(label: impl Into<String>, position: Position) -> Self {
        Self {
            label: label.into(),
            position,
        }
    }
}

/// Value object: Session ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        SessionId(value.to_string())
    }
}

/// Value object: Submission ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(pub String);

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SubmissionId {
    fn from(value: &str) -> Self {
        SubmissionId(value.to_string())
    }
}

/// One user's finalized placement for a session.
///
/// Immutable once persisted; stores only ever append them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// Client-supplied submission identifier
    #[serde(rename = "submissionID")]
    pub submission_id: SubmissionId,

    /// Session the submission belongs to
    #[serde(rename = "sessionID")]
    pub session_id: SessionId,

    /// Flattened node list
    pub nodes: Vec<Node>,

    /// When the submission was accepted
    pub created_at: DateTime<Utc>,
}

impl Submission {
    /// Create a new submission stamped with the current time
    pub fn new(session_id: SessionId, submission_id: SubmissionId, nodes: Vec<Node>) -> Self {
        Self {
            submission_id,
            session_id,
            nodes,
            created_at: Utc::now(),
        }
    }
}

/// Marker written into the `type` field of every [`PositionedInstance`]
pub const SUBMISSION_NODE_TYPE: &str = "submissionNode";

/// A single raw placement of a label, tagged with its origin submission.
///
/// Used for scatter plots of individual placements rather than averages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedInstance {
    /// Synthesized identifier: `submission-<index>-<label slug>`
    pub id: String,

    /// Always [`SUBMISSION_NODE_TYPE`]
    #[serde(rename = "type")]
    pub kind: String,

    /// Raw placement
    pub position: Position,

    /// Origin metadata
    pub data: InstanceData,
}

/// Origin metadata of a [`PositionedInstance`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceData {
    /// Node label
    pub label: String,

    /// Submission the placement came from
    #[serde(rename = "submissionID")]
    pub submission_id: SubmissionId,

    /// Zero-based index of that submission in store order
    pub submission_index: usize,
}

impl PositionedInstance {
    /// Project one node of the `submission_index`-th submission
    pub fn from_node(submission_index: usize, submission: &Submission, node: &Node) -> Self {
        Self {
            id: format!("submission-{}-{}", submission_index, label_slug(&node.label)),
            kind: SUBMISSION_NODE_TYPE.to_string(),
            position: node.position,
            data: InstanceData {
                label: node.label.clone(),
                submission_id: submission.submission_id.clone(),
                submission_index,
            },
        }
    }
}

/// Lower-cases a label and collapses every whitespace run into a single `-`.
pub fn label_slug(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    let mut in_whitespace = false;
    for ch in label.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
        } else {
            slug.extend(ch.to_lowercase());
            in_whitespace = false;
        }
    }
    slug
}
