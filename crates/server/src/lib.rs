//! jokepool server - HTTP API over the joke inventory
//!
//! - **Serve**: `GET /api/v1/joke` removes and returns one random joke, then
//!   requests a background replenishment.
//! - **Prime**: `POST /api/v1/joke` runs a replenishment and reports whether
//!   jokes were added, skipped or the generator degraded.
//! - **Diagnostics**: `GET /api/v1/pool`, `/health`, `/ready`, `/metrics`.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! Configuration comes from `server.{toml,yaml,json}` and `JOKEPOOL_SERVER__*`
//! variables; store, generator and policy from the YAML file named by
//! `jokepool_config` plus `OPEN_AI_API_KEY` and `REDIS_*`.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;
pub mod trigger;

pub use self::config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
pub use trigger::{NoopTrigger, QueuedTrigger, ReplenishTrigger};
