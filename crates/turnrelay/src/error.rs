//! Error types for the relay.
//!
//! Every failure is fatal to a run: nothing here is retried, errors only
//! travel upward to the top-level join.

use std::path::PathBuf;

use crate::stage::Stage;

/// Failures of the data-source provider.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to remove stale artifact {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no blob has been written yet")]
    Missing,
}

/// Failures of the fan-out counting pass.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FanOutError {
    /// Two sub-tasks tried to store a count under the same length.
    #[error("length {length} was counted more than once")]
    DuplicateLength { length: usize },

    /// A counting sub-task panicked or was aborted.
    #[error("counting task for length {length} failed: {message}")]
    Join { length: usize, message: String },

    /// A task outside the dispatched batch failed to join.
    #[error("untracked counting task {task_id} failed: {message}")]
    UntrackedTask { task_id: String, message: String },
}

/// Invalid configuration values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },

    #[error("batch size must be at least 1")]
    EmptyBatch,

    #[error("start length must be at least 1")]
    ZeroStartLength,

    #[error("word length range {min}..={max} is empty or starts at zero")]
    WordLengthRange { min: usize, max: usize },

    #[error("alphabet must not be empty")]
    EmptyAlphabet,

    #[error("word count {count} exceeds the limit of {max}")]
    WordCountTooLarge { count: usize, max: usize },
}

/// Umbrella error for a full relay run.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    FanOut(#[from] FanOutError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A stage task panicked or was aborted before returning.
    #[error("stage {stage} did not complete: {message}")]
    Stage { stage: Stage, message: String },

    /// A task that is not one of the three stages failed to join.
    #[error("untracked stage task {task_id} did not complete: {message}")]
    UntrackedTask { task_id: String, message: String },
}
