//! QA scoring: the seven-dimension rubric, aggregation, and reporting.

pub mod report;
pub mod score;
