//! Redis-backed cache gateway.

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use warden_application::CacheGateway;
use warden_core::{AppError, AppResult};

/// Redis implementation of the cache gateway port.
///
/// Keys arrive fully namespaced from the application layer and are stored
/// as-is. Entries expire through `SETEX`.
#[derive(Clone)]
pub struct RedisCacheGateway {
    client: redis::Client,
}

impl RedisCacheGateway {
    /// Creates a cache adapter with a configured Redis client.
    #[must_use]
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    async fn connection(&self) -> AppResult<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Internal(format!("failed to connect to redis: {error}")))
    }
}

#[async_trait]
impl CacheGateway for RedisCacheGateway {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut connection = self.connection().await?;

        connection.get::<_, Option<String>>(key).await.map_err(|error| {
            AppError::Internal(format!("failed to read cache entry '{key}': {error}"))
        })
    }

    async fn put(&self, key: &str, value: String, ttl_minutes: u32) -> AppResult<()> {
        if ttl_minutes == 0 {
            return Ok(());
        }

        let mut connection = self.connection().await?;
        connection
            .set_ex::<_, _, ()>(key, value, u64::from(ttl_minutes) * 60)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to write cache entry '{key}': {error}"))
            })
    }

    async fn forget(&self, key: &str) -> AppResult<()> {
        let mut connection = self.connection().await?;
        connection.del::<_, ()>(key).await.map_err(|error| {
            AppError::Internal(format!("failed to delete cache entry '{key}': {error}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use warden_application::CacheGateway;

    use super::RedisCacheGateway;

    fn test_gateway() -> Option<RedisCacheGateway> {
        let Ok(redis_url) = std::env::var("REDIS_URL") else {
            return None;
        };

        match redis::Client::open(redis_url.as_str()) {
            Ok(client) => Some(RedisCacheGateway::new(client)),
            Err(error) => panic!("failed to open REDIS_URL in test: {error}"),
        }
    }

    #[tokio::test]
    async fn put_get_and_forget_round_trip_through_redis() {
        let Some(cache) = test_gateway() else {
            return;
        };
        let key = format!("warden_test:roles_for_user:{}", std::process::id());

        assert!(cache.put(key.as_str(), "[]".to_owned(), 1).await.is_ok());
        assert_eq!(
            cache.get(key.as_str()).await.ok().flatten().as_deref(),
            Some("[]")
        );

        assert!(cache.forget(key.as_str()).await.is_ok());
        assert_eq!(cache.get(key.as_str()).await.ok().flatten(), None);
    }

    #[tokio::test]
    async fn zero_ttl_skips_redis_write() {
        let Some(cache) = test_gateway() else {
            return;
        };
        let key = format!("warden_test:zero_ttl:{}", std::process::id());

        assert!(cache.put(key.as_str(), "[]".to_owned(), 0).await.is_ok());
        assert_eq!(cache.get(key.as_str()).await.ok().flatten(), None);
    }
}
