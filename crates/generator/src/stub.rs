use async_trait::async_trait;
use inventory::Joke;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{ContentGenerator, GeneratorError};

const TEMPLATES: &[(&str, &str)] = &[
    (
        "Why did the {topic} fan bring a ladder?",
        "They heard the {topic} jokes were on another level.",
    ),
    (
        "What do you call a {topic} expert who tells dad jokes?",
        "A pun-{topic}-ist.",
    ),
    (
        "How does {topic} stay in shape?",
        "It runs through the punchlines every morning.",
    ),
    (
        "Why was the {topic} joke so quiet?",
        "It was still working on its delivery.",
    ),
];

/// Offline generator producing templated jokes.
///
/// Output depends only on the topic and an internal serial number, so two
/// batches from the same instance never collide while a fresh instance
/// replays the same sequence.
#[derive(Debug, Default)]
pub struct StubGenerator {
    serial: AtomicU64,
}

impl StubGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContentGenerator for StubGenerator {
    async fn generate(&self, topic: &str, count: usize) -> Result<Vec<Joke>, GeneratorError> {
        if count == 0 {
            return Err(GeneratorError::EmptyBatch);
        }
        let start = self.serial.fetch_add(count as u64, Ordering::Relaxed);
        let jokes = (start..start + count as u64)
            .map(|n| {
                let (setup, punchline) = TEMPLATES[(n as usize) % TEMPLATES.len()];
                Joke::new(
                    format!("{} (#{n})", setup.replace("{topic}", topic)),
                    punchline.replace("{topic}", topic),
                )
            })
            .collect();
        Ok(jokes)
    }

    fn name(&self) -> &str {
        "stub"
    }
}
