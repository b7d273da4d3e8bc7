use thiserror::Error;

/// Validation errors for caller-supplied input. These never reach the network.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
}

/// Failure of a single endpoint attempt, or of a whole fallback chain.
///
/// Endpoint-level variants (`Network`, `Upstream`, `Parse`) are converted
/// into "try the next endpoint" inside [`crate::FetchChain`]; callers only
/// ever observe `AllSourcesExhausted` or `EmptyChain`.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("upstream returned status {status}")]
    Upstream { status: u16 },
    #[error("malformed response body: {0}")]
    Parse(String),
    #[error("all sources exhausted (last error: {last})")]
    AllSourcesExhausted { last: Box<FetchError> },
    #[error("endpoint chain is empty")]
    EmptyChain,
}

impl FetchError {
    /// The error carried by the final failed attempt, if this is an
    /// exhaustion failure.
    pub fn last_attempt(&self) -> Option<&FetchError> {
        match self {
            Self::AllSourcesExhausted { last } => Some(last),
            _ => None,
        }
    }
}
