use std::time::Duration;

use crate::backend::{BackendConfig, InMemoryBackend, InventoryBackend};
use crate::{InventoryError, Joke};

/// Per-batch tally from [`InventoryStore::insert_many`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertReport {
    pub inserted: usize,
    pub duplicates: usize,
}

/// The joke inventory: a dedup index and a servable pool that only ever
/// change together, plus the fetch lease guarding replenishment.
pub struct InventoryStore {
    backend: Box<dyn InventoryBackend>,
}

impl InventoryStore {
    pub fn with_backend(backend: Box<dyn InventoryBackend>) -> Self {
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::with_backend(Box::new(InMemoryBackend::new()))
    }

    pub async fn connect(cfg: &BackendConfig) -> Result<Self, InventoryError> {
        Ok(Self::with_backend(cfg.build().await?))
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Admit `joke` unless its fingerprint is already present.
    pub async fn insert(&self, joke: &Joke) -> Result<bool, InventoryError> {
        let canonical = joke.canonical_json();
        let fingerprint = joke.fingerprint();
        let added = self.backend.insert(&fingerprint, &canonical).await?;
        if !added {
            tracing::debug!(fingerprint = %fingerprint, "duplicate joke rejected");
        }
        Ok(added)
    }

    /// Insert every candidate independently.
    pub async fn insert_many(&self, jokes: &[Joke]) -> Result<InsertReport, InventoryError> {
        let mut report = InsertReport::default();
        for joke in jokes {
            if self.insert(joke).await? {
                report.inserted += 1;
            } else {
                report.duplicates += 1;
            }
        }
        Ok(report)
    }

    /// Remove and return one uniformly random joke; `None` when the pool is empty.
    pub async fn take_random(&self) -> Result<Option<Joke>, InventoryError> {
        let Some(canonical) = self.backend.take_random().await? else {
            return Ok(None);
        };
        let joke = Joke::from_canonical_json(&canonical).map_err(|e| {
            InventoryError::Corrupt(format!("pool member is not a joke: {e}"))
        })?;
        Ok(Some(joke))
    }

    pub async fn count(&self) -> Result<usize, InventoryError> {
        self.backend.count().await
    }

    /// Size of the dedup index. Diagnostics only.
    pub async fn dedup_count(&self) -> Result<usize, InventoryError> {
        self.backend.dedup_len().await
    }

    /// Atomically take the fetch lease for `ttl`. The lease lapses on its own
    /// if [`release_fetch_lock`](Self::release_fetch_lock) is never called.
    pub async fn try_acquire_fetch_lock(&self, ttl: Duration) -> Result<bool, InventoryError> {
        let acquired = self.backend.try_acquire_lease(ttl).await?;
        tracing::debug!(acquired, ttl_ms = ttl.as_millis() as u64, "fetch lock attempt");
        Ok(acquired)
    }

    pub async fn release_fetch_lock(&self) -> Result<(), InventoryError> {
        self.backend.release_lease().await
    }

    /// Observation of the fetch lease. Never use for mutual exclusion.
    pub async fn is_fetching(&self) -> Result<bool, InventoryError> {
        self.backend.lease_held().await
    }
}

impl Default for InventoryStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Fingerprint;
    use async_trait::async_trait;

    struct GarbageBackend;

    #[async_trait]
    impl InventoryBackend for GarbageBackend {
        async fn insert(&self, _: &Fingerprint, _: &str) -> Result<bool, InventoryError> {
            Ok(true)
        }
        async fn take_random(&self) -> Result<Option<String>, InventoryError> {
            Ok(Some("{not a joke".into()))
        }
        async fn count(&self) -> Result<usize, InventoryError> {
            Ok(1)
        }
        async fn dedup_len(&self) -> Result<usize, InventoryError> {
            Ok(1)
        }
        async fn try_acquire_lease(&self, _: Duration) -> Result<bool, InventoryError> {
            Ok(true)
        }
        async fn release_lease(&self) -> Result<(), InventoryError> {
            Ok(())
        }
        async fn lease_held(&self) -> Result<bool, InventoryError> {
            Ok(false)
        }
        fn name(&self) -> &'static str {
            "garbage"
        }
    }

    #[tokio::test]
    async fn insert_many_counts_duplicates() {
        let store = InventoryStore::in_memory();
        let jokes = vec![
            Joke::new("a", "1"),
            Joke::new("b", "2"),
            Joke::new("a", "1"),
        ];
        let report = store.insert_many(&jokes).await.unwrap();
        assert_eq!(
            report,
            InsertReport {
                inserted: 2,
                duplicates: 1
            }
        );
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn take_random_surfaces_corrupt_members() {
        let store = InventoryStore::with_backend(Box::new(GarbageBackend));
        let err = store.take_random().await.unwrap_err();
        assert!(matches!(err, InventoryError::Corrupt(_)));
    }

    #[tokio::test]
    async fn release_clears_lease_immediately() {
        let store = InventoryStore::in_memory();
        let ttl = Duration::from_secs(60);
        assert!(store.try_acquire_fetch_lock(ttl).await.unwrap());
        assert!(store.is_fetching().await.unwrap());
        store.release_fetch_lock().await.unwrap();
        assert!(!store.is_fetching().await.unwrap());
        assert!(store.try_acquire_fetch_lock(ttl).await.unwrap());
    }
}
