use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;
use tokio::sync::mpsc;

use crate::error::AppResult;

/// Keys for cached provider lookups
#[derive(Debug, Clone, PartialEq)]
pub enum CacheKey {
    /// Geocoded coordinates for a location query
    Geocode(String),
    /// Trending venues near a coordinate (rounded to ~11m precision)
    TrendingVenues { lat: f64, lng: f64 },
    /// Place detail lookup by place id
    PlaceDetails(String),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Geocode(query) => write!(f, "geo:{}", query.to_lowercase()),
            CacheKey::TrendingVenues { lat, lng } => write!(f, "trending:{:.4}:{:.4}", lat, lng),
            CacheKey::PlaceDetails(id) => write!(f, "place:{}", id),
        }
    }
}

/// Creates a Redis client for caching
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Message for asynchronous cache writes
struct CacheWriteMessage {
    key: String,
    value: String,
    ttl: u64,
}

/// Redis-backed cache for provider responses.
///
/// Reads are fail-open: any Redis error is logged and treated as a miss, so a
/// cache outage never breaks an aggregation request. Writes go through a
/// background task and never block the caller.
#[derive(Clone)]
pub struct Cache {
    redis_client: Client,
    write_tx: mpsc::UnboundedSender<CacheWriteMessage>,
}

impl Cache {
    /// Creates a cache and spawns its background write task
    pub fn new(redis_client: Client) -> Self {
        let (write_tx, write_rx) = mpsc::unbounded_channel();

        let client = redis_client.clone();
        tokio::spawn(async move {
            Self::cache_writer_task(client, write_rx).await;
        });

        Self {
            redis_client,
            write_tx,
        }
    }

    async fn cache_writer_task(client: Client, mut write_rx: mpsc::UnboundedReceiver<CacheWriteMessage>) {
        tracing::debug!("Cache writer task started");

        while let Some(msg) = write_rx.recv().await {
            if let Err(e) = Self::write_to_redis(&client, msg).await {
                tracing::error!(error = %e, "Failed to write to Redis cache");
            }
        }

        tracing::debug!("Cache writer task stopped");
    }

    async fn write_to_redis(client: &Client, msg: CacheWriteMessage) -> AppResult<()> {
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(msg.key, msg.value, msg.ttl).await?;
        Ok(())
    }

    /// Retrieves a cached value, treating any Redis failure as a miss
    pub async fn get_or_miss<T: serde::de::DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let mut conn = match self.redis_client.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Cache unavailable, treating as miss");
                return None;
            }
        };

        let cached: Option<String> = match conn.get(format!("{}", key)).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Cache read failed, treating as miss");
                return None;
            }
        };

        let json = cached?;
        match serde_json::from_str(&json) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Cache entry failed to deserialize");
                None
            }
        }
    }

    /// Queues a value for caching without blocking the caller
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        let msg = CacheWriteMessage {
            key: format!("{}", key),
            value: json,
            ttl,
        };

        if let Err(e) = self.write_tx.send(msg) {
            tracing::error!(error = %e, "Failed to send cache write message");
        }
    }
}

/// Caches the result of an async block under the given key.
///
/// On a hit the cached value is returned without running the block. On a miss
/// (including any cache failure) the block runs, its `Ok` value is queued for
/// a background write, and the value is returned. The block's error type
/// passes through untouched.
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        if let Some(hit) = $cache.get_or_miss(&$key).await {
            Ok(hit)
        } else {
            match $block.await {
                Ok(value) => {
                    $cache.set_in_background(&$key, &value, $ttl);
                    Ok(value)
                }
                Err(e) => Err(e),
            }
        }
    }};
}
