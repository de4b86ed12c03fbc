//! Cross-submission aggregation.
//!
//! Reduces every submission of a session to one [`AggregatedNode`] per
//! expected label: the mean placement, a scalar prioritization derived
//! from it and an agreement score that decays with positional spread.
//! The result is ranked by prioritization, highest first.
//!
//! Aggregation is a pure function of the label set and the multiset of
//! submissions. Placements are summed in a canonical order, so the output
//! does not depend on the order submissions were stored in.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

use crate::domain::labels::LabelSet;
use crate::domain::submission::{Position, Submission};

/// Extent of the editing canvas, in canvas units
pub const DEFAULT_CANVAS_SCALE: f64 = 1000.0;

/// Agreement falls to `1/e` when the spread reaches `canvas_scale / AGREEMENT_DIVISOR`
const AGREEMENT_DIVISOR: f64 = 5.0;

/// Tunables of the aggregation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationConfig {
    /// Canvas extent used to normalize positional spread. Must be positive.
    pub canvas_scale: f64,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            canvas_scale: DEFAULT_CANVAS_SCALE,
        }
    }
}

/// Aggregate view of one expected label across a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedNode {
    /// `node-<k>`, where `k` is the 1-based position of the label in the label set
    pub id: String,

    /// Expected label
    pub label: String,

    /// Mean placement, absent when no submission placed the label
    pub position: Option<Position>,

    /// Number of placements contributing to the mean
    pub count: usize,

    /// Prioritization score: `(mean x + (-mean y)) / 2`
    pub mean_prioritization: f64,

    /// Agreement in `[0, 1]`; 1 is perfect agreement
    pub group_agreement: f64,
}

/// Stateless aggregation engine
#[derive(Debug, Clone, Copy, Default)]
pub struct AggregationEngine {
    config: AggregationConfig,
}

impl AggregationEngine {
    /// Create an engine with the given configuration
    pub fn new(config: AggregationConfig) -> Self {
        Self { config }
    }

    /// Aggregate a session's submissions into a ranked list with one entry
    /// per expected label.
    ///
    /// Labels outside `labels` are ignored. When a submission places the
    /// same label twice, both placements count.
    pub fn aggregate(&self, labels: &LabelSet, submissions: &[Submission]) -> Vec<AggregatedNode> {
        let mut placements: Vec<Vec<Position>> = vec![Vec::new(); labels.len()];
        for node in submissions.iter().flat_map(|s| s.nodes.iter()) {
            if let Some(index) = labels.position_of(&node.label) {
                placements[index].push(node.position);
            }
        }

        let mut result: Vec<AggregatedNode> = labels
            .iter()
            .zip(placements)
            .enumerate()
            .map(|(index, (label, positions))| self.summarize(index, label, positions))
            .collect();

        // Vec::sort_by is stable, so ties keep label-set order
        result.sort_by(|a, b| {
            b.mean_prioritization
                .partial_cmp(&a.mean_prioritization)
                .unwrap_or(Ordering::Equal)
        });

        debug!(
            submissions = submissions.len(),
            labels = labels.len(),
            "Aggregated session submissions"
        );
        result
    }

    fn summarize(&self, index: usize, label: &str, mut positions: Vec<Position>) -> AggregatedNode {
        let id = format!("node-{}", index + 1);
        let count = positions.len();

        if count == 0 {
            return AggregatedNode {
                id,
                label: label.to_string(),
                position: None,
                count: 0,
                mean_prioritization: 0.0,
                group_agreement: 0.0,
            };
        }

        // Canonical accumulation order keeps the floating-point result
        // independent of submission order.
        positions.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));

        let x = RunningMoments::over(positions.iter().map(|p| p.x));
        let y = RunningMoments::over(positions.iter().map(|p| p.y));
        let mean_prioritization = x.mean / 2.0 + (-y.mean) / 2.0;

        let group_agreement = if count == 1 {
            1.0
        } else {
            let spread = (x.variance() / 2.0 + y.variance() / 2.0).sqrt();
            let agreement = (-spread / (self.config.canvas_scale / AGREEMENT_DIVISOR)).exp();
            if agreement.is_nan() {
                0.0
            } else {
                agreement.clamp(0.0, 1.0)
            }
        };

        AggregatedNode {
            id,
            label: label.to_string(),
            position: Some(Position::new(x.mean, y.mean)),
            count,
            mean_prioritization,
            group_agreement,
        }
    }
}

/// Welford accumulator for the mean and population variance of one axis.
///
/// The mean moves by `x/k - mean/k`, which stays finite for any finite
/// input, so identical placements near `f64::MAX` still average to
/// themselves with zero variance.
#[derive(Debug, Default, Clone, Copy)]
struct RunningMoments {
    count: usize,
    mean: f64,
    m2: f64,
}

impl RunningMoments {
    fn over(values: impl Iterator<Item = f64>) -> Self {
        let mut moments = Self::default();
        for value in values {
            moments.push(value);
        }
        moments
    }

    fn push(&mut self, value: f64) {
        self.count += 1;
        let k = self.count as f64;
        let previous = self.mean;
        self.mean = previous + (value / k - previous / k);
        self.m2 += (value - previous) * (value - self.mean);
    }

    fn variance(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.m2 / self.count as f64
        }
    }
}

/// Aggregate with the default canvas scale
pub fn aggregate(labels: &LabelSet, submissions: &[Submission]) -> Vec<AggregatedNode> {
    AggregationEngine::default().aggregate(labels, submissions)
}

/// Aggregate with an explicit configuration
pub fn aggregate_with(
    config: AggregationConfig,
    labels: &LabelSet,
    submissions: &[Submission],
) -> Vec<AggregatedNode> {
    AggregationEngine::new(config).aggregate(labels, submissions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::submission::{Node, SessionId, SubmissionId};
    use pretty_assertions::assert_eq;

    fn submission(id: &str, nodes: &[(&str, f64, f64)]) -> Submission {
        Submission::new(
            SessionId::from("s"),
            SubmissionId::from(id),
            nodes
                .iter()
                .map(|(label, x, y)| Node::new(*label, Position::new(*x, *y)))
                .collect(),
        )
    }

    fn find<'a>(result: &'a [AggregatedNode], label: &str) -> &'a AggregatedNode {
        result.iter().find(|n| n.label == label).unwrap()
    }

    #[test]
    fn test_single_placement_has_full_agreement() {
        let labels = LabelSet::new(["A"]);
        let result = aggregate(&labels, &[submission("1", &[("A", 10.0, -30.0)])]);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "node-1");
        assert_eq!(result[0].position, Some(Position::new(10.0, -30.0)));
        assert_eq!(result[0].count, 1);
        assert_eq!(result[0].mean_prioritization, 20.0);
        assert_eq!(result[0].group_agreement, 1.0);
    }

    #[test]
    fn test_identical_placements_have_full_agreement() {
        let labels = LabelSet::new(["A"]);
        let subs: Vec<_> = (0..4)
            .map(|i| submission(&i.to_string(), &[("A", 7.0, 7.0)]))
            .collect();
        let result = aggregate(&labels, &subs);
        assert_eq!(result[0].count, 4);
        assert_eq!(result[0].group_agreement, 1.0);
    }

    #[test]
    fn test_unplaced_label_is_reported_empty() {
        let labels = LabelSet::new(["A", "B"]);
        let result = aggregate(&labels, &[submission("1", &[("A", 100.0, -100.0)])]);

        let b = find(&result, "B");
        assert_eq!(b.id, "node-2");
        assert_eq!(b.position, None);
        assert_eq!(b.count, 0);
        assert_eq!(b.mean_prioritization, 0.0);
        assert_eq!(b.group_agreement, 0.0);
    }

    #[test]
    fn test_unexpected_labels_are_ignored() {
        let labels = LabelSet::new(["A"]);
        let result = aggregate(
            &labels,
            &[submission("1", &[("A", 0.0, 0.0), ("Z", 500.0, 500.0)])],
        );
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].label, "A");
    }

    #[test]
    fn test_duplicate_label_in_one_submission_counts_twice() {
        let labels = LabelSet::new(["A"]);
        let result = aggregate(
            &labels,
            &[submission("1", &[("A", 0.0, 0.0), ("A", 10.0, 0.0)])],
        );
        assert_eq!(result[0].count, 2);
        assert_eq!(result[0].position, Some(Position::new(5.0, 0.0)));
    }

    #[test]
    fn test_agreement_uses_population_variance() {
        // var_x = 25, var_y = 0, spread = sqrt(12.5)
        let labels = LabelSet::new(["A"]);
        let result = aggregate(
            &labels,
            &[
                submission("1", &[("A", 0.0, 0.0)]),
                submission("2", &[("A", 10.0, 0.0)]),
            ],
        );
        let expected = (-(12.5f64).sqrt() / 200.0).exp();
        assert!((result[0].group_agreement - expected).abs() < 1e-12);
    }

    #[test]
    fn test_canvas_scale_controls_decay() {
        let labels = LabelSet::new(["A"]);
        let subs = [
            submission("1", &[("A", -100.0, 0.0)]),
            submission("2", &[("A", 100.0, 0.0)]),
        ];
        let wide = aggregate_with(AggregationConfig { canvas_scale: 10_000.0 }, &labels, &subs);
        let narrow = aggregate_with(AggregationConfig { canvas_scale: 100.0 }, &labels, &subs);
        assert!(wide[0].group_agreement > narrow[0].group_agreement);
        assert!(narrow[0].group_agreement >= 0.0);
    }

    #[test]
    fn test_ranking_is_descending_and_stable_on_ties() {
        let labels = LabelSet::new(["A", "B", "C", "D"]);
        let result = aggregate(
            &labels,
            &[submission(
                "1",
                &[
                    ("A", 0.0, 0.0),
                    ("B", 100.0, -100.0),
                    ("C", 0.0, 0.0),
                    ("D", -50.0, 50.0),
                ],
            )],
        );
        let order: Vec<_> = result.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(order, vec!["node-2", "node-1", "node-3", "node-4"]);
    }

    #[test]
    fn test_empty_input_yields_one_entry_per_label() {
        let labels = LabelSet::new(["A", "B"]);
        let result = aggregate(&labels, &[]);
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|n| n.count == 0 && n.position.is_none()));
        assert_eq!(result[0].id, "node-1");
    }

    #[test]
    fn test_identical_extreme_placements_keep_full_agreement() {
        let labels = LabelSet::new(["A"]);
        let subs = [
            submission("1", &[("A", 1e308, 0.0)]),
            submission("2", &[("A", 1e308, 0.0)]),
        ];
        let result = aggregate(&labels, &subs);

        assert_eq!(result[0].position, Some(Position::new(1e308, 0.0)));
        assert_eq!(result[0].mean_prioritization, 5e307);
        assert_eq!(result[0].group_agreement, 1.0);

        let value = serde_json::to_value(&result[0]).unwrap();
        assert!(value["position"]["x"].is_f64());
        assert!(value["meanPrioritization"].is_f64());
    }

    #[test]
    fn test_opposite_extreme_placements_stay_finite() {
        let labels = LabelSet::new(["A"]);
        let subs = [
            submission("1", &[("A", f64::MAX, -f64::MAX)]),
            submission("2", &[("A", -f64::MAX, f64::MAX)]),
        ];
        let result = aggregate(&labels, &subs);

        assert_eq!(result[0].position, Some(Position::new(0.0, 0.0)));
        assert_eq!(result[0].mean_prioritization, 0.0);
        assert_eq!(result[0].group_agreement, 0.0);
    }

    #[test]
    fn test_wire_names() {
        let labels = LabelSet::new(["A"]);
        let result = aggregate(&labels, &[]);
        let value = serde_json::to_value(&result[0]).unwrap();
        assert!(value.get("meanPrioritization").is_some());
        assert!(value.get("groupAgreement").is_some());
        assert!(value["position"].is_null());
    }
}
