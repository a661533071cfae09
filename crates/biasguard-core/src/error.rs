//! Error types for the review engine.

use biasguard_protocol::PatternId;
use thiserror::Error;

/// Errors returned by review engine operations.
#[derive(Debug, Error)]
pub enum ReviewError {
    /// Step ordering or turn structure is broken; analysis cannot run.
    #[error("malformed step sequence: {0}")]
    MalformedSequence(String),
    /// A record location references unknown or misordered steps.
    #[error("invalid location: {0}")]
    InvalidLocation(String),
    /// Pattern id is unknown to the annotation store.
    #[error("pattern not found: {0}")]
    NotFound(PatternId),
    /// Turn selection is outside the conversation.
    #[error("invalid turn {turn}: conversation has {total} turns")]
    InvalidTurn { turn: usize, total: usize },
    /// A record with this id already exists.
    #[error("duplicate pattern id: {0}")]
    DuplicatePattern(PatternId),
    /// Pattern type rejected by the catalog policy.
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),
    /// Export document was written by an unknown producer.
    #[error("unsupported export format: {0}")]
    UnsupportedExportFormat(String),
    /// Export document version is newer than this engine understands.
    #[error("unsupported export version: {0}")]
    UnsupportedExportVersion(u32),
    /// Export encoding failed.
    #[error("export error: {0}")]
    Export(String),
    /// JSON serialization error.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// CSV encoding error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
