//! Error types for clone operations.

use regraft_model::AccessError;
use thiserror::Error;

/// Result type alias for clone operations.
pub type CloneResult<T> = Result<T, CloneError>;

/// Errors that abort a clone call.
///
/// There is no partial result and no retry: the first failure propagates to
/// the caller and the in-progress copy is discarded along with the per-call
/// cache.
#[derive(Debug, Error)]
pub enum CloneError {
    /// The root (or a value the policy decided to follow) has no schema.
    #[error("no schema registered for `{type_name}`")]
    UnregisteredType { type_name: &'static str },

    /// A field accessor failed.
    #[error("field `{field}` on `{type_name}`: {source}")]
    FieldAccess {
        type_name: &'static str,
        field: &'static str,
        #[source]
        source: AccessError,
    },
}
