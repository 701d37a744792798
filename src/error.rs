//! Error types for ranking sessions and the embedding store.

use std::path::PathBuf;

/// Errors raised while ranking clues.
///
/// A disqualified candidate is not an error; it simply contributes no records.
#[derive(Debug, thiserror::Error)]
pub enum RankError {
    /// Two compared vectors have different lengths.
    #[error("vector dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// A vector produced a non-finite distance (NaN or infinite components).
    #[error("malformed vector for '{word}'")]
    MalformedVector { word: String },

    /// A partition scan failed; no partial results are kept.
    #[error("worker for partition {partition} failed: {source}")]
    WorkerFailure {
        partition: usize,
        #[source]
        source: Box<RankError>,
    },

    /// Tiering is undefined without friendly words.
    #[error("friendly word set is empty")]
    EmptyTargetSet,

    /// The same word was assigned to more than one team.
    #[error("word '{word}' appears in more than one target set")]
    DuplicateTarget { word: String },

    #[error("word '{word}' is not in the vocabulary")]
    UnknownWord { word: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to build worker pool: {0}")]
    WorkerPool(String),

    #[error("ranking cancelled")]
    Cancelled,
}

/// Errors raised while loading embeddings or configuration.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse embeddings in {path:?}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}
