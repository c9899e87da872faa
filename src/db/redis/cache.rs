use std::fmt::Display;

use redis::{AsyncCommands, Client};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::{mpsc, oneshot};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Next discovery page to scan for a user
    DiscoverCursor(i64),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::DiscoverCursor(user_id) => write!(f, "random_page:{}", user_id),
        }
    }
}

pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    Ok(Client::open(redis_url)?)
}

/// A serialized value waiting for `SET key value EX ttl`
struct PendingWrite {
    key: String,
    json: String,
    ttl_secs: u64,
}

/// JSON values in Redis with fire-and-forget writes
///
/// Reads go straight to Redis. Writes are queued to a single background task
/// so request handlers never wait on them.
#[derive(Clone)]
pub struct Cache {
    client: Client,
    writes: mpsc::UnboundedSender<PendingWrite>,
}

/// Stops the background writer once queued writes are flushed
pub struct CacheWriterHandle {
    stop: oneshot::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

impl CacheWriterHandle {
    pub async fn shutdown(self) {
        let _ = self.stop.send(());
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Cache writer task panicked");
        }
    }
}

impl Cache {
    pub async fn new(client: Client) -> (Self, CacheWriterHandle) {
        let (writes, queue) = mpsc::unbounded_channel();
        let (stop, stopped) = oneshot::channel();

        let task = tokio::spawn(run_writer(client.clone(), queue, stopped));

        (Self { client, writes }, CacheWriterHandle { stop, task })
    }

    /// Value stored under `key`, or `None` when missing or expired
    pub async fn get_from_cache<T: DeserializeOwned>(&self, key: &CacheKey) -> AppResult<Option<T>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let raw: Option<String> = conn.get(key.to_string()).await?;

        raw.map(|json| {
            serde_json::from_str(&json)
                .map_err(|e| AppError::Internal(format!("Corrupt cache entry {}: {}", key, e)))
        })
        .transpose()
    }

    /// Queues `value` under `key` with a TTL in seconds
    pub fn set_in_background<T: Serialize>(&self, key: &CacheKey, value: &T, ttl_secs: u64) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(key = %key, error = %e, "Could not serialize cache value");
                return;
            }
        };

        let write = PendingWrite {
            key: key.to_string(),
            json,
            ttl_secs,
        };
        if self.writes.send(write).is_err() {
            tracing::warn!(key = %key, "Cache writer stopped, dropping write");
        }
    }
}

async fn run_writer(
    client: Client,
    mut queue: mpsc::UnboundedReceiver<PendingWrite>,
    mut stopped: oneshot::Receiver<()>,
) {
    tracing::debug!("Cache writer started");

    loop {
        tokio::select! {
            write = queue.recv() => match write {
                Some(write) => apply(&client, write).await,
                None => break,
            },
            _ = &mut stopped => {
                queue.close();
                let mut flushed = 0;
                while let Some(write) = queue.recv().await {
                    apply(&client, write).await;
                    flushed += 1;
                }
                tracing::info!(flushed = flushed, "Cache writer flushed and stopped");
                return;
            }
        }
    }

    tracing::debug!("Cache writer stopped, all senders dropped");
}

async fn apply(client: &Client, write: PendingWrite) {
    let result = async {
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(&write.key, &write.json, write.ttl_secs).await?;
        Ok::<(), AppError>(())
    }
    .await;

    if let Err(e) = result {
        tracing::error!(key = %write.key, error = %e, "Cache write failed");
    }
}
