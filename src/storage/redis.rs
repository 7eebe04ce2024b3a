//! Redis-backed store.
//!
//! The connection manager is created lazily on first use, so a process can
//! start while Redis is down and begin caching once it comes up. Once
//! created it reconnects on its own after a dropped connection.

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tokio::sync::OnceCell;

use crate::error::{AppError, Result};
use crate::storage::{KeyValueStore, StoreError};

pub struct RedisStore {
    client: redis::Client,
    manager: OnceCell<ConnectionManager>,
}

impl RedisStore {
    /// Validate the URL without connecting.
    pub fn open(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| AppError::config(format!("Invalid redis url: {e}")))?;
        Ok(Self {
            client,
            manager: OnceCell::new(),
        })
    }

    /// A failed first connect leaves the cell empty; the next call retries.
    async fn connection(&self) -> std::result::Result<ConnectionManager, StoreError> {
        let manager = self
            .manager
            .get_or_try_init(|| async {
                log::debug!("Connecting to redis");
                ConnectionManager::new(self.client.clone()).await
            })
            .await?;
        Ok(manager.clone())
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> std::result::Result<Option<String>, StoreError> {
        let mut connection = self.connection().await?;
        let value: Option<String> = connection.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> std::result::Result<bool, StoreError> {
        let mut connection = self.connection().await?;
        let _: () = connection.set(key, value).await?;
        Ok(true)
    }
}
