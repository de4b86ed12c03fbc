//! Testing utilities for the consensus engine.
//!
//! Builders for submissions, the canonical end-to-end fixture and random
//! data generators, shared by the integration test suites.

pub mod builders;
pub mod data_generators;
pub mod fixtures;

pub use builders::SubmissionBuilder;
pub use fixtures::{e2e_labels, e2e_submissions, seeded_provider};
