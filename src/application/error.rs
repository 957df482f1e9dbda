use thiserror::Error;

/// The three faults the service distinguishes. Validation never touches the
/// store; a store fault fails the request outright with no retry.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("{0}")]
    Validation(String),
    #[error("task not found")]
    NotFound,
    #[error("store error: {0}")]
    Store(#[from] anyhow::Error),
}
