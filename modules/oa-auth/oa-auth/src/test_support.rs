//! In-memory cache store for tests and local runs without Redis.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::error::DomainError;
use crate::domain::store::CacheStore;

/// [`CacheStore`] backed by a `HashMap`.
///
/// Can be switched to fail every command, to exercise the store-error path.
#[derive(Debug, Default)]
pub struct InMemoryCacheStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
    unavailable: AtomicBool,
    reads: AtomicUsize,
}

impl InMemoryCacheStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: impl Into<String>, value: impl Into<Vec<u8>>) {
        self.entries.lock().insert(key.into(), value.into());
    }

    pub fn remove(&self, key: &str) {
        self.entries.lock().remove(key);
    }

    /// Make every following command fail (or succeed again).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of commands served so far.
    #[must_use]
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), DomainError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::CacheStore("connection refused".to_owned()));
        }
        Ok(())
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        self.check_available()?;
        Ok(self.entries.lock().contains_key(key))
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, DomainError> {
        self.check_available()?;
        Ok(self.entries.lock().get(key).cloned())
    }
}
