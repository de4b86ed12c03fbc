//! Error types for the Consensus Server
//!
//! This module contains the error types used throughout the server.

use consensus_core::ConsensusError;
use thiserror::Error;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    /// Error raised by the core services
    #[error(transparent)]
    Consensus(#[from] ConsensusError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Listener or socket failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for server operations
pub type ServerResult<T> = Result<T, ServerError>;

impl From<serde_json::Error> for ServerError {
    fn from(err: serde_json::Error) -> Self {
        ServerError::Consensus(ConsensusError::from(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consensus_error_is_transparent() {
        let err: ServerError = ConsensusError::NotFound("session".to_string()).into();
        assert_eq!(err.to_string(), "Not found: session");
        assert!(matches!(err, ServerError::Consensus(ConsensusError::NotFound(_))));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::AddrInUse, "port taken");
        let err: ServerError = io.into();
        assert_eq!(err.to_string(), "IO error: port taken");
        assert!(matches!(err, ServerError::Io(_)));
    }
}
