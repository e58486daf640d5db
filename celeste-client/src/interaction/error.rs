use thiserror::Error;

use crate::api::ApiError;

/// Why an interaction did not complete.
///
/// Precondition failures are reported before any optimistic change or
/// network call. `Api` is reported after the optimistic change has been
/// rolled back, so the collection is already back at its pre-call value.
#[derive(Error, Debug)]
pub enum InteractionError {
    #[error("Please sign in first")]
    NotSignedIn,

    #[error("Content cannot be empty")]
    EmptyContent,

    #[error("A request for {0} is already in progress")]
    InFlight(String),

    #[error("No item with id {0}")]
    UnknownItem(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl InteractionError {
    /// Precondition failures never touched local state or the network
    pub fn is_precondition(&self) -> bool {
        !matches!(self, InteractionError::Api(_))
    }
}
