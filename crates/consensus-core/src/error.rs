use thiserror::Error;

use crate::domain::graph_model::GraphError;

/// Core error type for the consensus engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConsensusError {
    /// A required request parameter was absent or blank
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    /// Malformed input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Nothing stored for the requested key
    #[error("Not found: {0}")]
    NotFound(String),

    /// Underlying store failed
    #[error("Store error: {0}")]
    Store(String),

    /// Editor rejected an operation
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for core operations
pub type ConsensusResult<T> = Result<T, ConsensusError>;

impl ConsensusError {
    /// Human-readable message without the variant prefix.
    ///
    /// The HTTP layer puts this in the `message` field of error bodies.
    pub fn message(&self) -> String {
        match self {
            ConsensusError::MissingParameter(name) => format!("{} is required", name),
            ConsensusError::Validation(msg)
            | ConsensusError::NotFound(msg)
            | ConsensusError::Store(msg)
            | ConsensusError::Serialization(msg) => msg.clone(),
            ConsensusError::Graph(err) => err.to_string(),
        }
    }

    /// Whether the error was caused by the caller's input
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ConsensusError::MissingParameter(_)
                | ConsensusError::Validation(_)
                | ConsensusError::Graph(_)
                | ConsensusError::NotFound(_)
        )
    }
}

impl From<serde_json::Error> for ConsensusError {
    fn from(err: serde_json::Error) -> Self {
        ConsensusError::Serialization(err.to_string())
    }
}
