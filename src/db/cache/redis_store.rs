use std::time::Duration;

use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tokio::sync::mpsc;

use super::{CacheKey, CacheStore};
use crate::error::CacheError;
use crate::models::ScoredCandidate;

const KEY_PREFIX: &str = "recs";

/// Parses `redis_url` into a client; no connection is made yet
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    Client::open(redis_url).map_err(|e| anyhow::anyhow!("Invalid REDIS_URL: {}", e))
}

/// A serialized entry waiting for the writer task
struct PendingWrite {
    key: String,
    value: String,
    ttl_secs: u64,
}

/// Redis-backed store for deployments running several instances
///
/// Reads go straight to Redis. Writes are serialized up front and handed to a
/// background task so a slow Redis never delays a response. Expiry is left to
/// Redis (`SET EX`), which also makes each write a whole-entry replacement.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    write_tx: mpsc::UnboundedSender<PendingWrite>,
}

/// Owned by `main`; flushes queued writes on shutdown
pub struct CacheWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

impl CacheWriterHandle {
    /// Signals the writer task and waits until queued writes are flushed
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        tracing::info!("Cache writer shutdown signal sent");
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Cache writer task panicked");
        }
    }
}

impl RedisStore {
    /// Connects to Redis and spawns the background writer task
    pub async fn connect(client: Client) -> Result<(Self, CacheWriterHandle), CacheError> {
        let conn = ConnectionManager::new(client).await?;
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let writer_conn = conn.clone();
        let task = tokio::spawn(async move {
            Self::cache_writer_task(writer_conn, write_rx, shutdown_rx).await;
        });

        Ok((
            Self { conn, write_tx },
            CacheWriterHandle { shutdown_tx, task },
        ))
    }

    /// Redis key for a cache key
    pub fn redis_key(key: &CacheKey) -> String {
        format!("{}:{}", KEY_PREFIX, key)
    }

    /// Background task that drains the write queue
    ///
    /// On shutdown the queue is closed and every message already queued is
    /// written before the task exits.
    async fn cache_writer_task(
        conn: ConnectionManager,
        mut write_rx: mpsc::UnboundedReceiver<PendingWrite>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!("Cache writer task started");

        loop {
            tokio::select! {
                msg = write_rx.recv() => {
                    let Some(msg) = msg else { break };
                    if let Err(e) = Self::write_to_redis(&conn, msg).await {
                        tracing::error!(error = %e, "Failed to write to Redis cache");
                    }
                }
                _ = shutdown_rx.recv() => {
                    write_rx.close();
                    let mut flushed = 0usize;
                    while let Some(msg) = write_rx.recv().await {
                        if let Err(e) = Self::write_to_redis(&conn, msg).await {
                            tracing::error!(error = %e, "Failed to flush cache write during shutdown");
                        } else {
                            flushed += 1;
                        }
                    }
                    tracing::info!(flushed, "Cache writer flushed pending writes");
                    break;
                }
            }
        }

        tracing::info!("Cache writer task stopped");
    }

    async fn write_to_redis(conn: &ConnectionManager, msg: PendingWrite) -> Result<(), CacheError> {
        let mut conn = conn.clone();
        let _: () = conn.set_ex(msg.key, msg.value, msg.ttl_secs).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<ScoredCandidate>>, CacheError> {
        let mut conn = self.conn.clone();
        let cached: Option<String> = conn.get(Self::redis_key(key)).await?;

        match cached {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn put(
        &self,
        key: &CacheKey,
        value: &[ScoredCandidate],
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let msg = PendingWrite {
            key: Self::redis_key(key),
            value: serde_json::to_string(value)?,
            ttl_secs: ttl.as_secs().max(1),
        };

        self.write_tx.send(msg).map_err(|_| CacheError::WriterClosed)
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
