use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;

use crate::{
    domain::aggregation::{AggregatedNode, AggregationEngine},
    domain::labels::LabelSet,
    domain::repository::SubmissionRepository,
    domain::submission::{PositionedInstance, SessionId, Submission},
    validation::require_param,
    ConsensusError, ConsensusResult,
};

/// Response of the aggregated view
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedView {
    /// One entry per expected label, highest prioritization first
    pub node_data: Vec<AggregatedNode>,
    /// Number of submissions in the session
    pub total_submissions: usize,
}

/// Response of the single-label raw view
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSubmissionsView {
    /// Every placement of the label, in store order
    pub node_submissions: Vec<PositionedInstance>,
    /// Number of submissions in the session
    pub total_submissions: usize,
}

/// Response of the all-labels raw view
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllNodeSubmissionsView {
    /// Placements bucketed by expected label, in label-set order
    pub node_submissions_map: IndexMap<String, Vec<PositionedInstance>>,
    /// Number of submissions in the session
    pub total_submissions: usize,
}

/// Read side over a session's submissions
pub struct QueryService {
    /// Submission store
    repo: Arc<dyn SubmissionRepository>,

    /// Labels the activity expects
    labels: LabelSet,

    /// Aggregation engine
    engine: AggregationEngine,
}

impl QueryService {
    /// Create a new query service
    pub fn new(
        repo: Arc<dyn SubmissionRepository>,
        labels: LabelSet,
        engine: AggregationEngine,
    ) -> Self {
        Self {
            repo,
            labels,
            engine,
        }
    }

    /// Expected label vocabulary
    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    /// Aggregate every submission of a session
    pub async fn get_aggregated(
        &self,
        session_id: Option<&str>,
    ) -> ConsensusResult<AggregatedView> {
        let session_id = require_param(session_id, "sessionID")?;
        let submissions = self.load_session(session_id).await?;

        let node_data = self.engine.aggregate(&self.labels, &submissions);
        tracing::info!(
            session_id = %session_id,
            total_submissions = submissions.len(),
            "Aggregated view computed"
        );

        Ok(AggregatedView {
            node_data,
            total_submissions: submissions.len(),
        })
    }

    /// Every raw placement of a single label.
    ///
    /// Any label is accepted, expected or not. A label that no submission
    /// placed is reported as not found.
    pub async fn get_node_submissions(
        &self,
        session_id: Option<&str>,
        node_label: Option<&str>,
    ) -> ConsensusResult<NodeSubmissionsView> {
        let session_id = require_param(session_id, "sessionID")?;
        let node_label = require_param(node_label, "nodeLabel")?;
        let submissions = self.load_session(session_id).await?;

        let node_submissions: Vec<PositionedInstance> = submissions
            .iter()
            .enumerate()
            .flat_map(|(index, submission)| {
                submission
                    .nodes
                    .iter()
                    .filter(move |node| node.label == node_label)
                    .map(move |node| PositionedInstance::from_node(index, submission, node))
            })
            .collect();

        if node_submissions.is_empty() {
            return Err(ConsensusError::NotFound(format!(
                "No submissions found for node label '{}'",
                node_label
            )));
        }

        tracing::debug!(
            session_id = %session_id,
            node_label = %node_label,
            placements = node_submissions.len(),
            "Single-label view computed"
        );

        Ok(NodeSubmissionsView {
            node_submissions,
            total_submissions: submissions.len(),
        })
    }

    /// Raw placements of every expected label, gathered in one pass
    pub async fn get_all_node_submissions(
        &self,
        session_id: Option<&str>,
    ) -> ConsensusResult<AllNodeSubmissionsView> {
        let session_id = require_param(session_id, "sessionID")?;
        let submissions = self.load_session(session_id).await?;

        let mut node_submissions_map: IndexMap<String, Vec<PositionedInstance>> = self
            .labels
            .iter()
            .map(|label| (label.to_string(), Vec::new()))
            .collect();

        for (index, submission) in submissions.iter().enumerate() {
            for node in &submission.nodes {
                if let Some(bucket) = node_submissions_map.get_mut(&node.label) {
                    bucket.push(PositionedInstance::from_node(index, submission, node));
                }
            }
        }

        tracing::debug!(
            session_id = %session_id,
            total_submissions = submissions.len(),
            "All-labels view computed"
        );

        Ok(AllNodeSubmissionsView {
            node_submissions_map,
            total_submissions: submissions.len(),
        })
    }

    async fn load_session(&self, session_id: &str) -> ConsensusResult<Vec<Submission>> {
        let submissions = self
            .repo
            .find_all_by_session(&SessionId::from(session_id))
            .await?;

        if submissions.is_empty() {
            tracing::debug!(session_id = %session_id, "No submissions for session");
            return Err(ConsensusError::NotFound(
                "No submissions found for this session".to_string(),
            ));
        }
        Ok(submissions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::submission::{Node, Position, SubmissionId};
    use async_trait::async_trait;
    use mockall::mock;
    use pretty_assertions::assert_eq;

    mock! {
        pub SubmissionRepo {}

        #[async_trait]
        impl SubmissionRepository for SubmissionRepo {
            async fn save(&self, submission: &Submission) -> Result<(), ConsensusError>;
            async fn find_all_by_session(
                &self,
                session_id: &SessionId,
            ) -> Result<Vec<Submission>, ConsensusError>;
        }
    }

    fn submission(id: &str, nodes: &[(&str, f64, f64)]) -> Submission {
        Submission::new(
            SessionId::from("s1"),
            SubmissionId::from(id),
            nodes
                .iter()
                .map(|(label, x, y)| Node::new(*label, Position::new(*x, *y)))
                .collect(),
        )
    }

    fn service_with(submissions: Vec<Submission>) -> QueryService {
        let mut repo = MockSubmissionRepo::new();
        repo.expect_find_all_by_session().returning(move |session_id| {
            if session_id.0 == "s1" {
                Ok(submissions.clone())
            } else {
                Ok(Vec::new())
            }
        });
        QueryService::new(
            Arc::new(repo),
            LabelSet::new(["A", "B"]),
            AggregationEngine::default(),
        )
    }

    fn two_submissions() -> Vec<Submission> {
        vec![
            submission("x", &[("A", 0.0, 0.0), ("B", 1.0, 1.0), ("Other", 5.0, 5.0)]),
            submission("y", &[("A", 10.0, 0.0)]),
        ]
    }

    #[tokio::test]
    async fn test_aggregated_view() {
        let service = service_with(two_submissions());
        let view = service.get_aggregated(Some("s1")).await.unwrap();

        assert_eq!(view.total_submissions, 2);
        assert_eq!(view.node_data.len(), 2);
        assert_eq!(view.node_data[0].label, "A");
        assert_eq!(view.node_data[0].count, 2);
    }

    #[tokio::test]
    async fn test_missing_session_is_rejected_before_store_access() {
        let service = QueryService::new(
            Arc::new(MockSubmissionRepo::new()),
            LabelSet::default(),
            AggregationEngine::default(),
        );

        let err = service.get_aggregated(None).await.unwrap_err();
        assert_eq!(err, ConsensusError::MissingParameter("sessionID".to_string()));
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let service = service_with(two_submissions());
        for result in [
            service.get_aggregated(Some("nope")).await.map(|_| ()),
            service.get_node_submissions(Some("nope"), Some("A")).await.map(|_| ()),
            service.get_all_node_submissions(Some("nope")).await.map(|_| ()),
        ] {
            assert!(matches!(result, Err(ConsensusError::NotFound(_))));
        }
    }

    #[tokio::test]
    async fn test_node_submissions_view() {
        let service = service_with(two_submissions());
        let view = service
            .get_node_submissions(Some("s1"), Some("A"))
            .await
            .unwrap();

        assert_eq!(view.total_submissions, 2);
        let ids: Vec<_> = view.node_submissions.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["submission-0-a", "submission-1-a"]);
        assert_eq!(view.node_submissions[1].data.submission_id, SubmissionId::from("y"));
    }

    #[tokio::test]
    async fn test_node_submissions_accepts_unexpected_label() {
        let service = service_with(two_submissions());
        let view = service
            .get_node_submissions(Some("s1"), Some("Other"))
            .await
            .unwrap();
        assert_eq!(view.node_submissions.len(), 1);
    }

    #[tokio::test]
    async fn test_node_submissions_errors() {
        let service = service_with(two_submissions());

        let err = service.get_node_submissions(Some("s1"), None).await.unwrap_err();
        assert_eq!(err, ConsensusError::MissingParameter("nodeLabel".to_string()));

        let err = service
            .get_node_submissions(Some("s1"), Some("Missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConsensusError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_all_node_submissions_view_follows_label_order() {
        let service = service_with(two_submissions());
        let view = service.get_all_node_submissions(Some("s1")).await.unwrap();

        let keys: Vec<_> = view.node_submissions_map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["A", "B"]);
        assert_eq!(view.node_submissions_map["A"].len(), 2);
        assert_eq!(view.node_submissions_map["B"].len(), 1);
        assert_eq!(view.total_submissions, 2);
    }

    #[tokio::test]
    async fn test_store_errors_pass_through() {
        let mut repo = MockSubmissionRepo::new();
        repo.expect_find_all_by_session()
            .returning(|_| Err(ConsensusError::Store("connection refused".to_string())));
        let service = QueryService::new(
            Arc::new(repo),
            LabelSet::default(),
            AggregationEngine::default(),
        );

        let err = service.get_aggregated(Some("s1")).await.unwrap_err();
        assert_eq!(err, ConsensusError::Store("connection refused".to_string()));
    }
}
