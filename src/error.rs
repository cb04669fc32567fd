//! Error taxonomy for assessment runs.
//!
//! Only run-level failures surface as [`AssessmentError`]. Metric-local and
//! collaborator failures are recovered where they happen and recorded in the
//! result instead.

use thiserror::Error;

/// A failure that aborts an assessment run before any result is produced.
#[derive(Debug, Error)]
pub enum AssessmentError {
    /// The graph or row set could not be produced from the input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The requested profile is not in the catalog.
    #[error("Unknown profile '{name}' (available: {available})")]
    UnknownProfile { name: String, available: String },

    /// The requested profile exists but not in this version.
    #[error("Profile '{profile}' has no version '{version}' (available: {available})")]
    UnknownVersion {
        profile: String,
        version: String,
        available: String,
    },

    /// The metric catalog itself is inconsistent.
    #[error("Invalid metric catalog: {0}")]
    InvalidCatalog(String),
}

/// A failure evaluating a single metric. Never escapes the evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetricError {
    #[error("malformed property path '{path}': {reason}")]
    MalformedPath { path: String, reason: String },

    #[error("unknown vocabulary '{0}'")]
    UnknownVocabulary(String),
}

/// A failure reported by an external collaborator (vocabulary lookup,
/// reachability check, shape validator). Degraded to a safe default by the
/// caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    #[error("request to {0} timed out")]
    Timeout(String),

    #[error("unknown vocabulary '{0}'")]
    UnknownVocabulary(String),

    #[error("{0}")]
    Other(String),
}

/// Result type for run-level operations.
pub type Result<T> = std::result::Result<T, AssessmentError>;
