//! Error types for the OA auth client.

use thiserror::Error;

/// Errors that can occur when using the OA auth client.
///
/// These represent infrastructure/transport failures only.
/// Authentication and authorization failures found in the cache are expressed
/// via [`CheckOutcome`](crate::CheckOutcome), not as error variants.
#[derive(Debug, Error)]
pub enum OaAuthError {
    /// The cache store could not be reached, rejected the command, or held a
    /// value that had to be JSON and was not.
    #[error("cache access failed: {0}")]
    CacheStore(String),

    /// The remote OA service could not be reached or returned an unusable response.
    #[error("remote request failed: {0}")]
    Http(String),

    /// Required configuration is missing or invalid.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl OaAuthError {
    /// Whether this error came from the cache store.
    #[must_use]
    pub fn is_cache_store(&self) -> bool {
        matches!(self, Self::CacheStore(_))
    }
}

/// Why a cached permission snapshot could not be used.
///
/// Not an error of the client: an unusable snapshot denies access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    /// The value decoded to a falsy JSON value.
    #[error("snapshot is empty")]
    Empty,

    /// The value is not JSON or does not have the snapshot shape.
    #[error("snapshot is malformed: {0}")]
    Malformed(String),
}
