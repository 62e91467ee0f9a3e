//! Redis-backed submission store

use anyhow::Context;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use testdrive_common::{Error, Result};
use tracing::info;

use crate::store::SubmissionStore;

/// Durable server-side store. Records are plain string values under their
/// `survey_submissions_*` key.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url).context("Failed to create Redis client")?;

        let conn = ConnectionManager::new(client)
            .await
            .context("Failed to connect to Redis")?;

        info!("Connected to Redis at {}", redis_url);

        Ok(Self { conn })
    }
}

#[async_trait]
impl SubmissionStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        conn.get(key)
            .await
            .map_err(|e| Error::Storage(e.to_string()))
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn
            .set(key, value)
            .await
            .map_err(|e| Error::Storage(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires Redis to be running
    async fn test_redis_store_get_set() {
        let store = RedisStore::connect("redis://127.0.0.1:6379/15").await.unwrap();
        let key = "survey_submissions_redis-store-test";

        store.set(key, "[]".to_string()).await.unwrap();
        assert_eq!(store.get(key).await.unwrap().as_deref(), Some("[]"));

        let mut conn = store.conn.clone();
        let _: () = conn.del(key).await.unwrap();
        assert_eq!(store.get(key).await.unwrap(), None);
    }
}
