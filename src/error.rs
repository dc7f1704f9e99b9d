use thiserror::Error;

/// Fatal engine conditions. Recoverable per-row anomalies never surface here;
/// they are counted in [`crate::RunSummary`] instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("input is missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("comment id {id:?} appears in more than one post group ({first} and {second})")]
    IdCollision { id: String, first: String, second: String },
}
