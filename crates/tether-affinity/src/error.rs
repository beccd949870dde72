//! Errors from the store-backed helpers. The pure engine never fails.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InheritError {
    #[error("operation not found: {0}")]
    OperationNotFound(String),

    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("state store error: {0}")]
    State(#[from] tether_state::StateError),
}

pub type InheritResult<T> = Result<T, InheritError>;
