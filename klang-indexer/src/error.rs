//! Error types for klang-indexer

use crate::source::SourceError;
use thiserror::Error;

/// Load-level errors.
///
/// Record-level defects (missing title, unparsable tags) are never surfaced
/// here; malformed records are dropped and counted during interpretation.
/// Only failures that abort the entire load appear in this enum.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The record source denied access. Recoverable by the user granting
    /// access and requesting a reindex.
    #[error("permission denied by record source")]
    NoPermission,

    /// The record source itself failed while being queried.
    #[error("record source error: {0}")]
    Source(#[from] SourceError),

    /// The finished graph failed validation. This indicates a grouping bug,
    /// not bad user data, and is not recoverable within the load.
    #[error("library graph invariant violated: {0}")]
    GraphInvariant(String),
}
