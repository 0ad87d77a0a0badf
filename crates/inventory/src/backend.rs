use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::fingerprint::Fingerprint;
use crate::InventoryError;

#[cfg(feature = "backend-redis")]
mod redis_backend;

#[cfg(feature = "backend-redis")]
pub use self::redis_backend::{RedisBackend, RedisKeys};

/// Storage primitives the inventory needs from a shared store.
///
/// Every method must be atomic with respect to every other method on the
/// same backend, across all processes sharing it. `insert` and
/// `take_random` mutate the dedup set and the pool together; nothing else
/// may touch either collection.
#[async_trait]
pub trait InventoryBackend: Send + Sync {
    /// Add `fingerprint` to the dedup set and `canonical` to the pool unless
    /// the fingerprint is already present. Returns whether it was added.
    async fn insert(&self, fingerprint: &Fingerprint, canonical: &str)
        -> Result<bool, InventoryError>;

    /// Remove one uniformly chosen pool member together with its
    /// fingerprint and return its canonical form.
    async fn take_random(&self) -> Result<Option<String>, InventoryError>;

    /// Number of pool members.
    async fn count(&self) -> Result<usize, InventoryError>;

    /// Number of fingerprints in the dedup set. Equal to [`count`](Self::count)
    /// whenever no operation is in flight.
    async fn dedup_len(&self) -> Result<usize, InventoryError>;

    /// Set the fetch lease if unset (or expired) and report whether this
    /// caller now holds it.
    async fn try_acquire_lease(&self, ttl: Duration) -> Result<bool, InventoryError>;

    /// Clear the fetch lease regardless of remaining time.
    async fn release_lease(&self) -> Result<(), InventoryError>;

    /// Whether an unexpired lease is currently set.
    async fn lease_held(&self) -> Result<bool, InventoryError>;

    fn name(&self) -> &'static str;
}

/// Selects and builds a backend.
///
/// ```
/// use inventory::BackendConfig;
///
/// let memory = BackendConfig::in_memory();
/// let redis = BackendConfig::redis_from_parts("127.0.0.1", 6379, "");
/// assert_eq!(memory, BackendConfig::InMemory);
/// assert!(matches!(redis, BackendConfig::Redis { .. }));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum BackendConfig {
    /// Process-local store. Atomic within one process only.
    #[default]
    InMemory,
    /// Redis (6.2+ for `ZRANDMEMBER`). `namespace` prefixes every key.
    Redis {
        url: String,
        #[serde(default)]
        namespace: Option<String>,
    },
}

impl BackendConfig {
    pub fn in_memory() -> Self {
        BackendConfig::InMemory
    }

    pub fn redis<U: Into<String>>(url: U) -> Self {
        BackendConfig::Redis {
            url: url.into(),
            namespace: None,
        }
    }

    /// Build a Redis URL from host, port and password, using the `default`
    /// ACL user and database 0. The password is percent-encoded.
    pub fn redis_from_parts(host: &str, port: u16, password: &str) -> Self {
        let url = if password.is_empty() {
            format!("redis://{host}:{port}/0")
        } else {
            let password = utf8_percent_encode(password, NON_ALPHANUMERIC);
            format!("redis://default:{password}@{host}:{port}/0")
        };
        Self::redis(url)
    }

    pub fn with_namespace<N: Into<String>>(self, ns: N) -> Self {
        match self {
            BackendConfig::Redis { url, .. } => BackendConfig::Redis {
                url,
                namespace: Some(ns.into()),
            },
            other => other,
        }
    }

    pub fn validate(&self) -> Result<(), InventoryError> {
        match self {
            BackendConfig::InMemory => Ok(()),
            BackendConfig::Redis { url, .. } => {
                if url.starts_with("redis://") || url.starts_with("rediss://") {
                    Ok(())
                } else {
                    Err(InventoryError::InvalidConfig(format!(
                        "redis url must start with redis:// or rediss://, got '{url}'"
                    )))
                }
            }
        }
    }

    /// Connect (for remote backends) and return the backend.
    pub async fn build(&self) -> Result<Box<dyn InventoryBackend>, InventoryError> {
        self.validate()?;
        match self {
            BackendConfig::InMemory => Ok(Box::new(InMemoryBackend::new())),
            BackendConfig::Redis { url, namespace } => {
                #[cfg(feature = "backend-redis")]
                {
                    let keys = RedisKeys::new(namespace.as_deref());
                    Ok(Box::new(RedisBackend::connect(url, keys).await?))
                }
                #[cfg(not(feature = "backend-redis"))]
                {
                    let _ = (url, namespace);
                    Err(InventoryError::backend(
                        "redis backend disabled at compile time",
                    ))
                }
            }
        }
    }
}

struct MemoryState {
    dedup: HashSet<Fingerprint>,
    pool: Vec<(Fingerprint, String)>,
    lease_until: Option<Instant>,
}

impl MemoryState {
    fn lease_active(&self, now: Instant) -> bool {
        self.lease_until.is_some_and(|until| until > now)
    }
}

/// Single-process backend. One mutex covers the dedup set, the pool and
/// the lease, which makes each operation atomic within the process.
pub struct InMemoryBackend {
    state: Mutex<MemoryState>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState {
                dedup: HashSet::new(),
                pool: Vec::new(),
                lease_until: None,
            }),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>, InventoryError> {
        self.state
            .lock()
            .map_err(|_| InventoryError::backend("poisoned lock"))
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InventoryBackend for InMemoryBackend {
    async fn insert(
        &self,
        fingerprint: &Fingerprint,
        canonical: &str,
    ) -> Result<bool, InventoryError> {
        let mut guard = self.lock()?;
        if !guard.dedup.insert(*fingerprint) {
            return Ok(false);
        }
        guard.pool.push((*fingerprint, canonical.to_string()));
        Ok(true)
    }

    async fn take_random(&self) -> Result<Option<String>, InventoryError> {
        let mut guard = self.lock()?;
        if guard.pool.is_empty() {
            return Ok(None);
        }
        let idx = fastrand::usize(..guard.pool.len());
        let (fingerprint, canonical) = guard.pool.swap_remove(idx);
        guard.dedup.remove(&fingerprint);
        Ok(Some(canonical))
    }

    async fn count(&self) -> Result<usize, InventoryError> {
        Ok(self.lock()?.pool.len())
    }

    async fn dedup_len(&self) -> Result<usize, InventoryError> {
        Ok(self.lock()?.dedup.len())
    }

    async fn try_acquire_lease(&self, ttl: Duration) -> Result<bool, InventoryError> {
        let mut guard = self.lock()?;
        let now = Instant::now();
        if guard.lease_active(now) {
            return Ok(false);
        }
        guard.lease_until = Some(now + ttl);
        Ok(true)
    }

    async fn release_lease(&self) -> Result<(), InventoryError> {
        self.lock()?.lease_until = None;
        Ok(())
    }

    async fn lease_held(&self) -> Result<bool, InventoryError> {
        Ok(self.lock()?.lease_active(Instant::now()))
    }

    fn name(&self) -> &'static str {
        "in_memory"
    }
}
