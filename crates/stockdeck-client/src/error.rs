use thiserror::Error;

use stockdeck_core::ValidationError;

/// Errors surfaced by the orchestration layer to its caller.
///
/// Fetch-level failures never appear here: the pipeline and the search
/// controller absorb them into their observable state (an error message or
/// a silently cleared panel, respectively).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("query text is empty")]
    EmptyInput,
    #[error("a query is already in flight")]
    Busy,
}
