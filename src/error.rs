/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Network or request execution error from `reqwest`.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// Invalid retry configuration (environment or JSON).
    #[error("config error: {0}")]
    Config(String),
    /// The caller cancelled the fetch before it completed.
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

/// Returned when a cancellable fetch observes its cancellation token.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, thiserror::Error)]
#[error("fetch cancelled")]
pub struct Cancelled;
