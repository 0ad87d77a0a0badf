//! Workspace umbrella crate for jokepool.
//!
//! Jokes live in a shared [`InventoryStore`] that refuses duplicates and
//! serves each joke once. A [`Replenisher`] tops the pool up from a
//! [`ContentGenerator`] whenever it runs low, with the store's fetch lease
//! ensuring only one caller generates at a time.
//!
//! ```
//! use jokepool::{build_replenisher, JokepoolConfig, ReplenishOutcome};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = JokepoolConfig::default();
//! config.generator.mode = "stub".into();
//!
//! let replenisher = build_replenisher(&config).await?;
//! let outcome = replenisher.run().await?;
//! assert!(matches!(outcome, ReplenishOutcome::Added { .. }));
//!
//! let joke = replenisher.store().take_random().await?;
//! assert!(joke.is_some());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod replenish;

pub use config::{ConfigLoadError, JokepoolConfig};
pub use generator::{
    ContentGenerator, GeneratorConfig, GeneratorError, OpenAiGenerator, StubGenerator,
    TOPICS, build_generator, random_topic,
};
pub use inventory::{
    BackendConfig, Fingerprint, InMemoryBackend, InsertReport, InventoryBackend,
    InventoryError, InventoryStore, Joke,
};
pub use replenish::{ReplenishOutcome, ReplenishPolicy, Replenisher, SkipReason};

use std::sync::Arc;
use thiserror::Error;

/// Failure wiring a deployment together from configuration.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigLoadError),
    #[error("store: {0}")]
    Store(#[from] InventoryError),
    #[error("generator: {0}")]
    Generator(#[from] GeneratorError),
}

/// Connect the configured store and generator and return a coordinator.
pub async fn build_replenisher(config: &JokepoolConfig) -> Result<Replenisher, SetupError> {
    config.replenish.validate()?;
    let generator = build_generator(&config.generator)?;
    let store = InventoryStore::connect(&config.store).await?;
    tracing::info!(
        backend = store.backend_name(),
        generator = generator.name(),
        "jokepool wired"
    );
    Ok(Replenisher::new(
        Arc::new(store),
        generator,
        config.replenish,
    ))
}
