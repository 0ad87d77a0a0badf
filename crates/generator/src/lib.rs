//! Content generator clients.
//!
//! A generator turns a topic and a batch size into candidate [`Joke`]s. It
//! holds no inventory state; callers decide what to keep.
//!
//! - [`OpenAiGenerator`] asks a chat-completions endpoint and parses the reply
//!   defensively (see [`parse_jokes`]).
//! - [`StubGenerator`] produces templated jokes offline for development and tests.
//!
//! ```
//! use generator::{build_generator, GeneratorConfig};
//!
//! # async fn demo() -> Result<(), generator::GeneratorError> {
//! let generator = build_generator(&GeneratorConfig::stub())?;
//! let jokes = generator.generate("dinosaurs", 3).await?;
//! assert_eq!(jokes.len(), 3);
//! # Ok(())
//! # }
//! ```

mod api;
pub mod config;
pub mod error;
mod parse;
pub mod retry;
mod serde_millis;
mod stub;
pub mod topics;

use async_trait::async_trait;
use std::sync::Arc;

pub use crate::api::OpenAiGenerator;
pub use crate::config::{GeneratorConfig, DEFAULT_API_URL};
pub use crate::error::GeneratorError;
pub use crate::parse::parse_jokes;
pub use crate::retry::{execute_with_retry_async, RetryConfig, RetryResult};
pub use crate::stub::StubGenerator;
pub use crate::topics::{random_topic, TOPICS};
pub use inventory::Joke;

/// Source of candidate jokes.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Produce up to `count` jokes about `topic`.
    async fn generate(&self, topic: &str, count: usize) -> Result<Vec<Joke>, GeneratorError>;

    /// Short label for logs and metrics.
    fn name(&self) -> &str;
}

/// Build the generator selected by `cfg.mode`.
pub fn build_generator(cfg: &GeneratorConfig) -> Result<Arc<dyn ContentGenerator>, GeneratorError> {
    cfg.validate()?;
    match cfg.mode.as_str() {
        "stub" => Ok(Arc::new(StubGenerator::new())),
        _ => Ok(Arc::new(OpenAiGenerator::new(cfg.clone())?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_generator_selects_by_mode() {
        let stub = build_generator(&GeneratorConfig::stub()).unwrap();
        assert_eq!(stub.name(), "stub");

        let openai = build_generator(&GeneratorConfig {
            api_key: Some("sk-test".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(openai.name(), "openai");
    }

    #[test]
    fn build_generator_surfaces_config_errors() {
        let err = build_generator(&GeneratorConfig::default()).err().unwrap();
        assert!(matches!(err, GeneratorError::InvalidConfig(_)));
    }
}
