//! Error types.

use thiserror::Error;

use crate::reactive::SourceId;

/// Errors surfaced by the fallible reactive APIs.
#[derive(Debug, Error)]
pub enum ReactiveError {
    /// A compute function panicked during [`Computed::try_get`](crate::reactive::Computed::try_get).
    /// The computed is left stale.
    #[error("computation of {computed} panicked: {message}")]
    ComputationPanicked { computed: SourceId, message: String },
}

pub type Result<T> = std::result::Result<T, ReactiveError>;
