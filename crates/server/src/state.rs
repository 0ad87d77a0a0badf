use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::trigger::{QueuedTrigger, ReplenishTrigger};
use inventory::InventoryStore;
use jokepool::{build_replenisher, JokepoolConfig, Replenisher};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Coordinator shared by the prime route and the background worker
    pub replenisher: Replenisher,

    /// Fired after every successful serve
    pub trigger: Arc<dyn ReplenishTrigger>,

    /// Prometheus renderer, present when a recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        replenisher: Replenisher,
        trigger: Arc<dyn ReplenishTrigger>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            replenisher,
            trigger,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Wire store, generator and background worker from configuration.
    pub async fn from_config(config: ServerConfig) -> ServerResult<Self> {
        let pool_config = JokepoolConfig::load(config.jokepool_config.as_deref())
            .map_err(jokepool::SetupError::from)?;
        let replenisher = build_replenisher(&pool_config).await?;
        let (trigger, _worker) =
            QueuedTrigger::spawn(replenisher.clone(), config.trigger_queue_depth);
        Ok(Self::new(config, replenisher, Arc::new(trigger)))
    }

    pub fn store(&self) -> &Arc<InventoryStore> {
        self.replenisher.store()
    }
}

/// Server metadata for health checks
#[derive(Debug, serde::Serialize)]
pub struct ServerMetadata {
    pub version: String,
    pub uptime_seconds: u64,
}
