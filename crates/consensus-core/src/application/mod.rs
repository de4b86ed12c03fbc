/// Read views over a session's submissions
pub mod query_service;

/// Submission write path
pub mod submission_service;

/// Free-form diagram records
pub mod flow_service;
