use thiserror::Error;

/// Errors surfaced by the inventory store and its backends.
///
/// Duplicate rejection and an empty pool are normal outcomes (`false` and
/// `None`), never errors. Anything reported here means the backing store
/// itself could not be used.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("backend error: {0}")]
    Backend(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("corrupt pool entry: {0}")]
    Corrupt(String),
    #[error("invalid store config: {0}")]
    InvalidConfig(String),
}

impl InventoryError {
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        Self::Backend(err.to_string())
    }
}

#[cfg(feature = "backend-redis")]
impl From<redis::RedisError> for InventoryError {
    fn from(err: redis::RedisError) -> Self {
        Self::Backend(format!("redis: {err}"))
    }
}
