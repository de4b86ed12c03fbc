//! Request parameter helpers shared by the application services.

use crate::error::ConsensusError;

/// Returns the parameter value, or `MissingParameter` when it is absent or blank.
pub fn require_param<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, ConsensusError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConsensusError::MissingParameter(name.to_string())),
    }
}
