use std::future::Future;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use warden_core::{AppError, AppResult};

/// Cache port for memoized role and permission lookups.
///
/// Values are opaque strings; [`remember`] stores JSON-encoded payloads.
#[async_trait]
pub trait CacheGateway: Send + Sync {
    /// Returns the live value stored under `key`.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Stores a value under `key` for `ttl_minutes`.
    async fn put(&self, key: &str, value: String, ttl_minutes: u32) -> AppResult<()>;

    /// Removes the value stored under `key`, if any.
    async fn forget(&self, key: &str) -> AppResult<()>;
}

/// Returns the cached value for `key`, computing and storing it on a miss.
///
/// A `ttl_minutes` of zero runs the producer without storing its result. An
/// entry that no longer decodes as `T` is treated as a miss and replaced.
pub async fn remember<T, F, Fut>(
    cache: &dyn CacheGateway,
    key: &str,
    ttl_minutes: u32,
    producer: F,
) -> AppResult<T>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    if let Some(encoded) = cache.get(key).await? {
        match serde_json::from_str::<T>(encoded.as_str()) {
            Ok(value) => return Ok(value),
            Err(error) => warn!(
                cache_key = %key,
                error = %error,
                "discarding undecodable cache entry"
            ),
        }
    }

    debug!(cache_key = %key, ttl_minutes, "cache miss");
    let value = producer().await?;
    if ttl_minutes == 0 {
        return Ok(value);
    }

    let encoded = serde_json::to_string(&value).map_err(|error| {
        AppError::Internal(format!("failed to encode cache entry '{key}': {error}"))
    })?;
    cache.put(key, encoded, ttl_minutes).await?;

    Ok(value)
}

#[cfg(test)]
mod tests {
    use warden_core::AppResult;

    use super::remember;
    use crate::test_support::FakeCache;

    #[tokio::test]
    async fn remember_stores_value_on_miss() {
        let cache = FakeCache::default();

        let value: AppResult<Vec<String>> =
            remember(&cache, "names", 5, || async { Ok(vec!["a".to_owned()]) }).await;

        assert_eq!(value.unwrap_or_default(), vec!["a".to_owned()]);
        assert_eq!(cache.stored("names").await.as_deref(), Some(r#"["a"]"#));
        assert_eq!(cache.puts().await, 1);
    }

    #[tokio::test]
    async fn remember_skips_producer_on_hit() {
        let cache = FakeCache::default();
        cache.seed("names", r#"["cached"]"#).await;

        let value: AppResult<Vec<String>> = remember(&cache, "names", 5, || async {
            Ok(vec!["fresh".to_owned()])
        })
        .await;

        assert_eq!(value.unwrap_or_default(), vec!["cached".to_owned()]);
        assert_eq!(cache.puts().await, 0);
    }

    #[tokio::test]
    async fn remember_with_zero_ttl_does_not_store() {
        let cache = FakeCache::default();

        let value: AppResult<Vec<String>> =
            remember(&cache, "names", 0, || async { Ok(vec!["a".to_owned()]) }).await;

        assert!(value.is_ok());
        assert_eq!(cache.stored("names").await, None);
    }

    #[tokio::test]
    async fn remember_replaces_undecodable_entry() {
        let cache = FakeCache::default();
        cache.seed("names", "not json").await;

        let value: AppResult<Vec<String>> =
            remember(&cache, "names", 5, || async { Ok(vec!["a".to_owned()]) }).await;

        assert_eq!(value.unwrap_or_default(), vec!["a".to_owned()]);
        assert_eq!(cache.stored("names").await.as_deref(), Some(r#"["a"]"#));
    }
}
