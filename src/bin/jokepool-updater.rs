//! One-shot replenishment run.
//!
//! Intended for schedulers and out-of-band triggers: loads configuration,
//! runs the coordinator once and exits. Exit status is non-zero only when
//! configuration or the backing store is unusable.
//!
//! ```text
//! jokepool-updater [CONFIG.yaml]
//! ```

use std::path::PathBuf;

use anyhow::Context;
use jokepool::{JokepoolConfig, build_replenisher};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        )
        .with_target(false)
        .json()
        .init();

    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = JokepoolConfig::load(path.as_deref())
        .with_context(|| format!("loading configuration from {path:?}"))?;

    let replenisher = build_replenisher(&config).await?;
    let outcome = replenisher.run().await?;

    println!("{}", serde_json::to_string(&outcome)?);
    Ok(())
}
