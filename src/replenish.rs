//! Replenishment coordinator.
//!
//! A run walks `CHECKING -> (SKIP | FETCHING) -> INSERTING`. The pool-size and
//! in-flight checks are a cheap advisory filter; only the store's atomic fetch
//! lock decides who actually calls the generator. Once the lock is held it is
//! released on every path out of the run, and the lease covers crashes.

use std::sync::Arc;
use std::time::{Duration, Instant};

use generator::{ContentGenerator, random_topic};
use inventory::{InventoryError, InventoryStore};
use serde::{Deserialize, Serialize};

use crate::config::ConfigLoadError;

/// Tunable thresholds for a replenishment run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplenishPolicy {
    /// Runs skip while the pool holds more than this many jokes.
    pub low_water_mark: usize,
    /// Candidates requested from the generator per run.
    pub batch_size: usize,
    /// Fetch lease duration. Bounds starvation after a crashed run.
    pub lease_ttl_ms: u64,
    /// Upper bound on a single generator call.
    pub generator_timeout_ms: u64,
}

impl Default for ReplenishPolicy {
    fn default() -> Self {
        Self {
            low_water_mark: 5,
            batch_size: 10,
            lease_ttl_ms: 10_000,
            generator_timeout_ms: 10_000,
        }
    }
}

impl ReplenishPolicy {
    pub fn lease_ttl(&self) -> Duration {
        Duration::from_millis(self.lease_ttl_ms)
    }

    pub fn generator_timeout(&self) -> Duration {
        Duration::from_millis(self.generator_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.batch_size == 0 {
            return Err(ConfigLoadError::Validation(
                "replenish.batch_size must be >= 1".to_string(),
            ));
        }
        if self.lease_ttl_ms == 0 {
            return Err(ConfigLoadError::Validation(
                "replenish.lease_ttl_ms must be > 0".to_string(),
            ));
        }
        if self.generator_timeout_ms == 0 {
            return Err(ConfigLoadError::Validation(
                "replenish.generator_timeout_ms must be > 0".to_string(),
            ));
        }
        if self.generator_timeout_ms > self.lease_ttl_ms {
            tracing::warn!(
                lease_ttl_ms = self.lease_ttl_ms,
                generator_timeout_ms = self.generator_timeout_ms,
                "generator timeout exceeds fetch lease; a slow batch may overlap a second fetch"
            );
        }
        Ok(())
    }
}

/// Why a run did not fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    PoolSufficient { count: usize },
    FetchInFlight,
    /// Another caller won the fetch lock between the check and the acquire.
    LockContended,
}

/// Result of one coordinator run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReplenishOutcome {
    Added {
        topic: String,
        inserted: usize,
        duplicates: usize,
    },
    Skipped(SkipReason),
    /// The generator failed or timed out; nothing was inserted.
    Degraded { topic: String, reason: String },
}

impl ReplenishOutcome {
    /// Metric label for this outcome.
    pub fn label(&self) -> &'static str {
        match self {
            ReplenishOutcome::Added { .. } => "added",
            ReplenishOutcome::Skipped(_) => "skipped",
            ReplenishOutcome::Degraded { .. } => "degraded",
        }
    }
}

/// Runs the check, lock, fetch, insert cycle against a shared store.
#[derive(Clone)]
pub struct Replenisher {
    store: Arc<InventoryStore>,
    generator: Arc<dyn ContentGenerator>,
    policy: ReplenishPolicy,
}

impl Replenisher {
    pub fn new(
        store: Arc<InventoryStore>,
        generator: Arc<dyn ContentGenerator>,
        policy: ReplenishPolicy,
    ) -> Self {
        Self {
            store,
            generator,
            policy,
        }
    }

    pub fn store(&self) -> &Arc<InventoryStore> {
        &self.store
    }

    pub fn policy(&self) -> &ReplenishPolicy {
        &self.policy
    }

    /// Run one replenishment cycle.
    ///
    /// Generator faults come back as [`ReplenishOutcome::Degraded`]. Only an
    /// unusable backing store is an error.
    pub async fn run(&self) -> Result<ReplenishOutcome, InventoryError> {
        let started = Instant::now();
        let result = self.run_cycle().await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(outcome) => {
                metrics::counter!("jokepool_replenish_runs_total", "outcome" => outcome.label())
                    .increment(1);
                if let ReplenishOutcome::Added {
                    inserted,
                    duplicates,
                    ..
                } = outcome
                {
                    metrics::counter!("jokepool_jokes_inserted_total").increment(*inserted as u64);
                    metrics::counter!("jokepool_jokes_duplicate_total")
                        .increment(*duplicates as u64);
                }
                tracing::info!(outcome = ?outcome, elapsed_ms, "replenishment finished");
            }
            Err(err) => {
                metrics::counter!("jokepool_replenish_runs_total", "outcome" => "error")
                    .increment(1);
                tracing::error!(error = %err, elapsed_ms, "replenishment failed");
            }
        }
        result
    }

    async fn run_cycle(&self) -> Result<ReplenishOutcome, InventoryError> {
        let count = self.store.count().await?;
        if count > self.policy.low_water_mark {
            return Ok(ReplenishOutcome::Skipped(SkipReason::PoolSufficient {
                count,
            }));
        }
        if self.store.is_fetching().await? {
            return Ok(ReplenishOutcome::Skipped(SkipReason::FetchInFlight));
        }
        if !self
            .store
            .try_acquire_fetch_lock(self.policy.lease_ttl())
            .await?
        {
            return Ok(ReplenishOutcome::Skipped(SkipReason::LockContended));
        }

        let result = self.fetch_and_insert().await;

        // The lease expires on its own, so a failed release is logged rather
        // than allowed to mask the run's result.
        if let Err(err) = self.store.release_fetch_lock().await {
            tracing::warn!(error = %err, "failed to release fetch lock; waiting for lease expiry");
        }
        result
    }

    async fn fetch_and_insert(&self) -> Result<ReplenishOutcome, InventoryError> {
        let topic = random_topic();
        let batch = tokio::time::timeout(
            self.policy.generator_timeout(),
            self.generator.generate(topic, self.policy.batch_size),
        )
        .await;

        let jokes = match batch {
            Ok(Ok(jokes)) => jokes,
            Ok(Err(err)) => {
                tracing::warn!(
                    topic,
                    generator = self.generator.name(),
                    error = %err,
                    "generator failed"
                );
                return Ok(ReplenishOutcome::Degraded {
                    topic: topic.to_string(),
                    reason: err.to_string(),
                });
            }
            Err(_) => {
                tracing::warn!(
                    topic,
                    generator = self.generator.name(),
                    timeout_ms = self.policy.generator_timeout_ms,
                    "generator timed out"
                );
                return Ok(ReplenishOutcome::Degraded {
                    topic: topic.to_string(),
                    reason: format!(
                        "generator timed out after {}ms",
                        self.policy.generator_timeout_ms
                    ),
                });
            }
        };

        let report = self.store.insert_many(&jokes).await?;
        tracing::debug!(
            topic,
            candidates = jokes.len(),
            inserted = report.inserted,
            duplicates = report.duplicates,
            "batch inserted"
        );
        Ok(ReplenishOutcome::Added {
            topic: topic.to_string(),
            inserted: report.inserted,
            duplicates: report.duplicates,
        })
    }
}
