//! Random test data.

use rand::Rng;

use consensus_core::{LabelSet, Submission};

use crate::builders::SubmissionBuilder;

/// Generate `count` submissions placing every label of `labels` at a
/// uniformly random point of a `scale`-wide canvas centered on the origin.
pub fn random_submissions<R: Rng>(
    rng: &mut R,
    session_id: &str,
    labels: &LabelSet,
    count: usize,
    scale: f64,
) -> Vec<Submission> {
    let half = scale / 2.0;
    (0..count)
        .map(|i| {
            let mut builder = SubmissionBuilder::new(session_id, format!("random-{}", i));
            for label in labels.iter() {
                let x = rng.gen_range(-half..half);
                let y = rng.gen_range(-half..half);
                builder = builder.node(label, x, y);
            }
            builder.build()
        })
        .collect()
}
