//! Cache Task
//!
//! Single-writer alternative to the mutex-guarded map: one task owns the
//! store and serves operations sent over a channel.

use std::borrow::Borrow;
use std::hash::Hash;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::{CacheStats, TtlStore};
use crate::clock::Clock;
use crate::config::Config;
use crate::error::{CacheError, Result};

/// Operation sent to the owning task, each carrying its reply channel.
enum Command<K, V> {
    Put {
        key: K,
        value: V,
        ttl: Duration,
        reply: oneshot::Sender<Result<Option<V>>>,
    },
    Get {
        key: K,
        reply: oneshot::Sender<Option<V>>,
    },
    ContainsKey {
        key: K,
        reply: oneshot::Sender<bool>,
    },
    Remove {
        key: K,
        reply: oneshot::Sender<Option<V>>,
    },
    Clear {
        reply: oneshot::Sender<()>,
    },
    Len {
        reply: oneshot::Sender<usize>,
    },
    Stats {
        reply: oneshot::Sender<CacheStats>,
    },
}

/// Async handle to a store owned by a cache task.
///
/// Cloning is cheap. The task stops once every handle has been dropped.
#[derive(Debug)]
pub struct CacheHandle<K, V> {
    tx: mpsc::Sender<Command<K, V>>,
}

impl<K, V> Clone for CacheHandle<K, V> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<K, V> std::fmt::Debug for Command<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Command::Put { .. } => "Put",
            Command::Get { .. } => "Get",
            Command::ContainsKey { .. } => "ContainsKey",
            Command::Remove { .. } => "Remove",
            Command::Clear { .. } => "Clear",
            Command::Len { .. } => "Len",
            Command::Stats { .. } => "Stats",
        };
        f.write_str(name)
    }
}

/// Moves `store` into a background task and returns a handle to it.
///
/// Operations are applied one at a time in arrival order, so the task is the
/// only writer and no lock is needed. `buffer` bounds the number of queued
/// commands; callers wait when it is full.
///
/// # Returns
/// The handle plus the task's JoinHandle, which completes once every
/// `CacheHandle` is dropped.
///
/// # Example
/// ```ignore
/// let store = TtlStore::new(1000)?;
/// let (cache, task) = spawn_cache_task(store, 64);
/// cache.put("Foo".to_string(), "Bar".to_string(), Duration::from_secs(1)).await?;
/// drop(cache);
/// task.await?;
/// ```
pub fn spawn_cache_task<K, V, C>(
    mut store: TtlStore<K, V, C>,
    buffer: usize,
) -> (CacheHandle<K, V>, JoinHandle<()>)
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Clone + Send + 'static,
    C: Clock + 'static,
{
    let (tx, mut rx) = mpsc::channel(buffer.max(1));

    let handle = tokio::spawn(async move {
        info!(capacity = store.capacity(), "cache task started");

        while let Some(command) = rx.recv().await {
            debug!(?command, "cache task command");
            // A dropped reply receiver only means the caller gave up waiting
            match command {
                Command::Put {
                    key,
                    value,
                    ttl,
                    reply,
                } => {
                    let _ = reply.send(store.put(key, value, ttl));
                }
                Command::Get { key, reply } => {
                    let _ = reply.send(store.get(&key));
                }
                Command::ContainsKey { key, reply } => {
                    let _ = reply.send(store.contains_key(&key));
                }
                Command::Remove { key, reply } => {
                    let _ = reply.send(store.remove(&key));
                }
                Command::Clear { reply } => {
                    store.clear();
                    let _ = reply.send(());
                }
                Command::Len { reply } => {
                    let _ = reply.send(store.len());
                }
                Command::Stats { reply } => {
                    let _ = reply.send(store.stats());
                }
            }
        }

        info!("cache task stopped, all handles dropped");
    });

    (CacheHandle { tx }, handle)
}

/// Spawns a cache task whose command channel is sized by
/// `config.channel_buffer`.
pub fn spawn_cache_task_from_config<K, V, C>(
    store: TtlStore<K, V, C>,
    config: &Config,
) -> (CacheHandle<K, V>, JoinHandle<()>)
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Clone + Send + 'static,
    C: Clock + 'static,
{
    info!(
        channel_buffer = config.channel_buffer,
        "spawning cache task from config"
    );
    spawn_cache_task(store, config.channel_buffer)
}

impl<K, V> CacheHandle<K, V> {
    /// Sends a command and waits for its reply.
    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command<K, V>,
    ) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| CacheError::Closed)?;
        rx.await.map_err(|_| CacheError::Closed)
    }

    /// Stores `value` under `key` for `ttl`, returning the previous value.
    pub async fn put(&self, key: K, value: V, ttl: Duration) -> Result<Option<V>> {
        self.request(|reply| Command::Put {
            key,
            value,
            ttl,
            reply,
        })
        .await?
    }

    pub async fn get<Q>(&self, key: &Q) -> Result<Option<V>>
    where
        K: Borrow<Q>,
        Q: ToOwned<Owned = K> + ?Sized,
    {
        let key = key.to_owned();
        self.request(|reply| Command::Get { key, reply }).await
    }

    pub async fn contains_key<Q>(&self, key: &Q) -> Result<bool>
    where
        K: Borrow<Q>,
        Q: ToOwned<Owned = K> + ?Sized,
    {
        let key = key.to_owned();
        self.request(|reply| Command::ContainsKey { key, reply })
            .await
    }

    pub async fn remove<Q>(&self, key: &Q) -> Result<Option<V>>
    where
        K: Borrow<Q>,
        Q: ToOwned<Owned = K> + ?Sized,
    {
        let key = key.to_owned();
        self.request(|reply| Command::Remove { key, reply }).await
    }

    pub async fn clear(&self) -> Result<()> {
        self.request(|reply| Command::Clear { reply }).await
    }

    pub async fn len(&self) -> Result<usize> {
        self.request(|reply| Command::Len { reply }).await
    }

    pub async fn stats(&self) -> Result<CacheStats> {
        self.request(|reply| Command::Stats { reply }).await
    }

    /// Returns true once the owning task has stopped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
