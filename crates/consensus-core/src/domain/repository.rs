//! Repository traits for the consensus engine
//!
//! Persistence is reached only through these traits. Store crates
//! implement them; the application services hold them as trait objects.

use async_trait::async_trait;

use super::flow::{FlowRecord, FlowRecordId, GroupId};
use super::submission::{SessionId, Submission};
use crate::ConsensusError;

/// Append-only store of submissions, keyed by session
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    /// Persist a submission. Duplicate submission ids are stored again.
    async fn save(&self, submission: &Submission) -> Result<(), ConsensusError>;

    /// All submissions of a session, in the order they were saved
    async fn find_all_by_session(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<Submission>, ConsensusError>;
}

/// Store of free-form diagram records
#[async_trait]
pub trait FlowRepository: Send + Sync {
    /// Persist a flow record
    async fn save(&self, record: &FlowRecord) -> Result<(), ConsensusError>;

    /// All records of a group, oldest first
    async fn find_by_group(&self, group_id: &GroupId) -> Result<Vec<FlowRecord>, ConsensusError>;

    /// Find a record by id
    async fn find_by_id(&self, id: &FlowRecordId) -> Result<Option<FlowRecord>, ConsensusError>;
}
