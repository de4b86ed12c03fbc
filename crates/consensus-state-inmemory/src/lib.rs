//! In-memory store implementation for the consensus engine
//!
//! This crate provides in-memory implementations of the repository
//! interfaces defined in consensus-core. It is useful for development,
//! testing and single-process deployments where persistence is not required.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub mod repositories;
pub use repositories::{InMemoryFlowRepository, InMemorySubmissionRepository};

use consensus_core::{
    domain::flow::FlowRecord,
    domain::repository::{FlowRepository, SubmissionRepository},
    SessionId, Submission,
};


/// Provider for in-memory repositories.
///
/// Repositories created from the same provider share storage.
pub struct InMemoryStoreProvider {
    // Submissions per session, in insertion order
    submissions: Arc<RwLock<HashMap<SessionId, Vec<Submission>>>>,

    // Flow records, in insertion order
    flows: Arc<RwLock<Vec<FlowRecord>>>,
}

impl InMemoryStoreProvider {
    /// Create a new, empty provider
    pub fn new() -> Self {
        Self {
            submissions: Arc::new(RwLock::new(HashMap::new())),
            flows: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Create repositories backed by this provider's storage
    pub fn create_repositories(&self) -> (Arc<dyn SubmissionRepository>, Arc<dyn FlowRepository>) {
        let submission_repo = Arc::new(InMemorySubmissionRepository::new(
            self.submissions.clone(),
        ));
        let flow_repo = Arc::new(InMemoryFlowRepository::new(self.flows.clone()));

        (submission_repo, flow_repo)
    }
}

impl Default for InMemoryStoreProvider {
    fn default() -> Self {
        Self::new()
    }
}
