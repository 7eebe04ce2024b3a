//! Key-value backends for the entity cache.
//!
//! Values are opaque strings. Backends report their own faults; the cache
//! layer above decides to swallow them.

pub mod memory;
#[cfg(feature = "cache-redis")]
pub mod redis;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryStore;
#[cfg(feature = "cache-redis")]
pub use self::redis::RedisStore;

/// A store operation that did not complete.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Backend could not be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[cfg(feature = "cache-redis")]
    #[error("redis error: {0}")]
    Redis(#[from] ::redis::RedisError),
}

/// String key-value store used by the entity cache.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value. `Ok(None)` is a miss.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value. Returns whether the backend acknowledged the write.
    async fn set(&self, key: &str, value: &str) -> Result<bool, StoreError>;
}
