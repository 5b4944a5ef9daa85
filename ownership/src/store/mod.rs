//! Expiring key-value storage for outstanding challenges.
//!
//! Keys are WebID strings and values are secrets. Every entry carries a
//! time-to-live enforced by the store; expired entries read as absent.

mod file;
mod memory;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::StoreError;

pub use file::FileStore;
pub use memory::MemoryStore;

/// String-to-string map whose entries expire.
#[async_trait]
pub trait ExpiringStore: Send + Sync {
    /// Returns the live value for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key` for `ttl`, replacing any previous entry.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be written.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Stores `value` under `key` for `ttl` only if no live entry exists.
    ///
    /// Returns the live value that prevented the write, or `None` if
    /// `value` was stored. The check and the write are one atomic step.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be read or written.
    async fn insert_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<Option<String>, StoreError>;

    /// Removes `key`. Returns whether a live entry was removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be written.
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;
}

#[async_trait]
impl<S: ExpiringStore + ?Sized> ExpiringStore for std::sync::Arc<S> {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        (**self).set(key, value, ttl).await
    }

    async fn insert_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<Option<String>, StoreError> {
        (**self).insert_if_absent(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        (**self).delete(key).await
    }
}
