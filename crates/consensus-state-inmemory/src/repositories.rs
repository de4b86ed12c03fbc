use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use consensus_core::{
    domain::flow::{FlowRecord, FlowRecordId, GroupId},
    domain::repository::{FlowRepository, SubmissionRepository},
    ConsensusError, SessionId, Submission,
};

/// In-memory implementation of the SubmissionRepository
pub struct InMemorySubmissionRepository {
    submissions: Arc<RwLock<HashMap<SessionId, Vec<Submission>>>>,
}

impl InMemorySubmissionRepository {
    /// Create a repository over shared storage
    pub fn new(submissions: Arc<RwLock<HashMap<SessionId, Vec<Submission>>>>) -> Self {
        Self { submissions }
    }
}

impl Default for InMemorySubmissionRepository {
    fn default() -> Self {
        Self::new(Arc::new(RwLock::new(HashMap::new())))
    }
}

#[async_trait]
impl SubmissionRepository for InMemorySubmissionRepository {
    async fn save(&self, submission: &Submission) -> Result<(), ConsensusError> {
        let mut submissions = self.submissions.write().await;
        let session = submissions
            .entry(submission.session_id.clone())
            .or_default();
        session.push(submission.clone());
        debug!(
            session_id = %submission.session_id,
            stored = session.len(),
            "Appended submission"
        );
        Ok(())
    }

    async fn find_all_by_session(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<Submission>, ConsensusError> {
        let submissions = self.submissions.read().await;
        Ok(submissions.get(session_id).cloned().unwrap_or_default())
    }
}

/// In-memory implementation of the FlowRepository
pub struct InMemoryFlowRepository {
    flows: Arc<RwLock<Vec<FlowRecord>>>,
}

impl InMemoryFlowRepository {
    /// Create a repository over shared storage
    pub fn new(flows: Arc<RwLock<Vec<FlowRecord>>>) -> Self {
        Self { flows }
    }
}

impl Default for InMemoryFlowRepository {
    fn default() -> Self {
        Self::new(Arc::new(RwLock::new(Vec::new())))
    }
}

#[async_trait]
impl FlowRepository for InMemoryFlowRepository {
    async fn save(&self, record: &FlowRecord) -> Result<(), ConsensusError> {
        let mut flows = self.flows.write().await;
        flows.push(record.clone());
        debug!(flow_id = %record.id, group_id = %record.group_id, "Stored flow record");
        Ok(())
    }

    async fn find_by_group(&self, group_id: &GroupId) -> Result<Vec<FlowRecord>, ConsensusError> {
        let flows = self.flows.read().await;
        Ok(flows
            .iter()
            .filter(|record| &record.group_id == group_id)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: &FlowRecordId) -> Result<Option<FlowRecord>, ConsensusError> {
        let flows = self.flows.read().await;
        Ok(flows.iter().find(|record| &record.id == id).cloned())
    }
}
