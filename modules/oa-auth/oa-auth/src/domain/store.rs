//! Read-only port to the shared cache store.

use async_trait::async_trait;

use super::error::DomainError;

/// Cache store holding entries written by the OA system.
///
/// Implementations report every connectivity or protocol failure as
/// [`DomainError::CacheStore`] and never retry.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Whether `key` exists.
    async fn exists(&self, key: &str) -> Result<bool, DomainError>;

    /// Raw bytes stored under `key`, `None` when the key does not exist.
    ///
    /// Values are returned undecoded; their encoding is the caller's concern.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, DomainError>;
}
