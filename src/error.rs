//! Error types for the topic report pipeline.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::assign::TopicId;

#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot read {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed table {}: {reason}", path.display())]
    MalformedTable { path: PathBuf, reason: String },

    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    #[error("duplicate record identifier '{0}'")]
    DuplicateId(String),

    #[error("topic assigner returned {topics} topic ids for {records} records")]
    ShapeMismatch { records: usize, topics: usize },

    #[error("sentiment scorer returned {scores} scores for {records} records")]
    ScoreMismatch { records: usize, scores: usize },

    #[error("record '{id}' of topic {topic} is missing from the metadata table")]
    Reference { id: String, topic: TopicId },

    #[error("topic assigner failed: {0}")]
    Assigner(String),

    #[error("topic assigner did not finish within {0:?}")]
    AssignerTimeout(Duration),

    #[error("failed to write {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
