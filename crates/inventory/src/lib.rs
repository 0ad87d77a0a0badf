//! Joke inventory: deduplicated, serve-once storage for pre-generated jokes.
//!
//! Two collections live behind one [`InventoryBackend`]:
//!
//! - the **dedup index**, a set of [`Fingerprint`]s
//! - the **servable pool**, the jokes waiting to be handed out
//!
//! A fingerprint is in the index iff its joke is in the pool. Only
//! [`InventoryStore::insert`] and [`InventoryStore::take_random`] change
//! either collection, and each does so in one atomic backend operation.
//!
//! A third piece of state, the **fetch lease**, is a self-expiring flag that
//! keeps replenishment to one fetch at a time. [`InventoryStore::try_acquire_fetch_lock`]
//! is the only authoritative way to claim it.
//!
//! ## Delivery
//!
//! `take_random` is a destructive read: selection is uniform over the
//! members present at that moment and the returned joke is gone from both
//! collections. There is no ordering between inserts and takes.

mod backend;
mod error;
mod fingerprint;
mod joke;
mod store;

#[cfg(feature = "backend-redis")]
pub use crate::backend::{RedisBackend, RedisKeys};
pub use crate::backend::{BackendConfig, InMemoryBackend, InventoryBackend};
pub use crate::error::InventoryError;
pub use crate::fingerprint::{Fingerprint, FINGERPRINT_HEX_LEN};
pub use crate::joke::Joke;
pub use crate::store::{InsertReport, InventoryStore};
