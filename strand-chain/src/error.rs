use strand_core::error::WiringError;
use thiserror::Error;

/// Errors returned when assembling or starting a chain.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ChainError {
    /// `run()` was called outside a tokio runtime.
    #[error("no tokio runtime available to run the chain")]
    NoDispatcher,

    /// The source has nothing wired to its `next` port.
    #[error("{node} has no downstream component wired")]
    Disconnected {
        /// Label of the unwired node.
        node: String,
    },

    /// The builder reached `max_stages`.
    #[error("chain exceeds the configured limit of {limit} stages")]
    TooManyStages {
        /// The configured limit.
        limit: usize,
    },

    /// Wiring a node failed.
    #[error("wiring error: {0}")]
    Wiring(#[from] WiringError),
}
