use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::AppError;
use crate::error::AppResult;
use crate::models::DiscoverQuery;

/// Keys for cached TMDB responses
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Search results for (language, query)
    TvSearch(String, String),
    TvDetails(u64),
    TopRated,
    Popular,
    Genres(String),
    Discover(DiscoverQuery),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::TvSearch(language, query) => {
                write!(f, "tv:search:{}:{}", language, query.trim().to_lowercase())
            }
            CacheKey::TvDetails(id) => write!(f, "tv:details:{}", id),
            CacheKey::TopRated => write!(f, "tv:top_rated"),
            CacheKey::Popular => write!(f, "tv:popular"),
            CacheKey::Genres(language) => write!(f, "tv:genres:{}", language),
            CacheKey::Discover(query) => write!(
                f,
                "tv:discover:{}:{}:{}:{}",
                query.language,
                query.sort.as_str(),
                query.genre.map(|g| g.to_string()).unwrap_or_else(|| "all".to_string()),
                query.page
            ),
        }
    }
}

/// Creates a Redis client for caching
///
/// `Client::open` only parses the URL; connections are made lazily.
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Pending write handed to the background writer
struct CacheWrite {
    key: String,
    value: String,
    ttl: u64,
}

/// Read-through cache for catalog responses
///
/// Reads hit Redis directly. Writes are queued to a background task so a
/// cache miss never makes the caller wait on the store.
#[derive(Clone)]
pub struct Cache {
    redis_client: Client,
    write_tx: mpsc::UnboundedSender<CacheWrite>,
}

/// Handle for flushing and stopping the cache writer
pub struct CacheWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<usize>,
}

impl CacheWriterHandle {
    /// Signals the writer to drain queued writes and waits for it to exit
    ///
    /// Returns the number of writes stored during the final flush.
    pub async fn shutdown(self) -> usize {
        if self.shutdown_tx.send(()).await.is_err() {
            tracing::warn!("Cache writer already stopped before shutdown");
        }

        match self.task.await {
            Ok(flushed) => flushed,
            Err(e) => {
                tracing::error!(error = %e, "Cache writer task failed");
                0
            }
        }
    }
}

impl Cache {
    /// Creates the cache and spawns its writer task
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(redis_client: Client) -> (Self, CacheWriterHandle) {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let task = tokio::spawn(Self::run_writer(redis_client.clone(), write_rx, shutdown_rx));

        (
            Self {
                redis_client,
                write_tx,
            },
            CacheWriterHandle { shutdown_tx, task },
        )
    }

    async fn run_writer(
        client: Client,
        mut write_rx: mpsc::UnboundedReceiver<CacheWrite>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) -> usize {
        tracing::info!("Cache writer started");

        loop {
            tokio::select! {
                Some(write) = write_rx.recv() => {
                    if let Err(e) = Self::store(&client, write).await {
                        tracing::warn!(error = %e, "Cache write failed");
                    }
                }
                _ = shutdown_rx.recv() => {
                    // Stop accepting, then drain what is already queued
                    write_rx.close();
                    let mut flushed = 0usize;
                    while let Some(write) = write_rx.recv().await {
                        match Self::store(&client, write).await {
                            Ok(()) => flushed += 1,
                            Err(e) => tracing::warn!(error = %e, "Cache write failed during flush"),
                        }
                    }
                    tracing::info!(flushed, "Cache writer stopped");
                    return flushed;
                }
            }
        }
    }

    async fn store(client: &Client, write: CacheWrite) -> AppResult<()> {
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(write.key, write.value, write.ttl).await?;
        Ok(())
    }

    /// Returns the cached value for `key`, or `None` on a miss
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(key.to_string()).await?;

        cached
            .map(|json| {
                serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })
            })
            .transpose()
    }

    /// Queues `value` for storage under `key` with a TTL in seconds
    ///
    /// Returns immediately. Serialization and send failures are logged, not
    /// returned, since a lost cache write only costs a future miss.
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let value = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, key = %key, "Cache serialization error");
                return;
            }
        };

        let write = CacheWrite {
            key: key.to_string(),
            value,
            ttl,
        };

        if self.write_tx.send(write).is_err() {
            tracing::warn!(key = %key, "Cache writer is stopped, dropping write");
        }
    }
}
