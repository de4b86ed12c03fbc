/// Submission domain models and raw placement projections
pub mod submission;

/// Expected label vocabulary
pub mod labels;

/// Single-user graph editor
pub mod graph_model;

/// Cross-submission aggregation
pub mod aggregation;

/// Free-form diagram records
pub mod flow;

/// Repository interfaces
pub mod repository;
