//! Service-level error taxonomy, mapped onto HTTP statuses by the API layer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// No session principal attached to the request.
    #[error("Unauthorized")]
    Unauthenticated,

    /// Authenticated, but not a party allowed to perform the operation.
    #[error("{0}")]
    Forbidden(&'static str),

    /// A referenced resource does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Malformed or semantically invalid input.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}
