//! Shared fixtures.

use consensus_core::{ConsensusError, LabelSet, Submission, SubmissionRepository};
use consensus_state_inmemory::InMemoryStoreProvider;

use crate::builders::SubmissionBuilder;

/// Labels of the canonical two-label example
pub fn e2e_labels() -> LabelSet {
    LabelSet::new(["A", "B"])
}

/// Three submissions of the canonical example: A placed twice 10 units
/// apart on the x axis, B placed once.
pub fn e2e_submissions(session_id: &str) -> Vec<SubmissionBuilder> {
    vec![
        SubmissionBuilder::new(session_id, "sub-1").node("A", 0.0, 0.0),
        SubmissionBuilder::new(session_id, "sub-2").node("A", 10.0, 0.0),
        SubmissionBuilder::new(session_id, "sub-3").node("B", 5.0, 5.0),
    ]
}

/// A provider whose store already holds `submissions`
pub async fn seeded_provider(
    submissions: Vec<Submission>,
) -> Result<InMemoryStoreProvider, ConsensusError> {
    let provider = InMemoryStoreProvider::new();
    let (submission_repo, _) = provider.create_repositories();
    for submission in &submissions {
        submission_repo.save(submission).await?;
    }
    Ok(provider)
}
