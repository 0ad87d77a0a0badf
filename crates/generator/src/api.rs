use async_trait::async_trait;
use inventory::Joke;
use serde_json::{json, Value};

use crate::parse::parse_jokes;
use crate::retry::{execute_with_retry_async, RetryResult};
use crate::{ContentGenerator, GeneratorConfig, GeneratorError};

const SYSTEM_PROMPT: &str = "Generate Dad jokes. Give your response in plain JSON (with emojies) \
(as an API) in the format of { jokes: [ setup: setup, puchline:  puchline ] } without ```json tags";

/// Chat-completions client (OpenAI or any API-compatible endpoint).
pub struct OpenAiGenerator {
    client: reqwest::Client,
    cfg: GeneratorConfig,
}

impl OpenAiGenerator {
    pub fn new(cfg: GeneratorConfig) -> Result<Self, GeneratorError> {
        cfg.validate()?;
        let client = reqwest::Client::builder()
            .timeout(cfg.timeout())
            .connect_timeout(cfg.connect_timeout())
            .build()
            .map_err(|e| GeneratorError::InvalidConfig(format!("http client: {e}")))?;
        Ok(Self { client, cfg })
    }

    async fn send_once(&self, payload: &Value) -> Result<Vec<Joke>, GeneratorError> {
        let mut request = self.client.post(&self.cfg.api_url).json(payload);
        if let Some(key) = self.cfg.api_key.as_deref() {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeneratorError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response.json().await?;
        let content = extract_message_content(body)?;
        parse_jokes(&content)
    }
}

#[async_trait]
impl ContentGenerator for OpenAiGenerator {
    async fn generate(&self, topic: &str, count: usize) -> Result<Vec<Joke>, GeneratorError> {
        let payload = build_chat_payload(&self.cfg, topic, count);

        let outcome = if self.cfg.enable_resilience {
            let retry_cfg = self.cfg.retry_config.unwrap_or_default();
            let payload = &payload;
            execute_with_retry_async(&retry_cfg, move |_| self.send_once(payload)).await
        } else {
            RetryResult {
                result: self.send_once(&payload).await,
                attempts: 1,
                total_duration: Default::default(),
            }
        };

        tracing::debug!(
            topic,
            attempts = outcome.attempts,
            elapsed_ms = outcome.total_duration.as_millis() as u64,
            ok = outcome.succeeded(),
            "chat completion finished"
        );
        outcome.into_result()
    }

    fn name(&self) -> &str {
        "openai"
    }
}

pub(crate) fn build_chat_payload(cfg: &GeneratorConfig, topic: &str, count: usize) -> Value {
    json!({
        "model": cfg.model,
        "temperature": cfg.temperature,
        "messages": [
            { "role": "developer", "content": SYSTEM_PROMPT },
            { "role": "user", "content": format!("Generate {count} unique dad jokes about {topic}") },
        ],
    })
}

/// Pull `choices[0].message.content` out of a chat-completions response.
pub(crate) fn extract_message_content(body: Value) -> Result<String, GeneratorError> {
    let content = body
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"));

    match content {
        Some(Value::String(text)) => Ok(text.clone()),
        Some(Value::Null) | None => {
            if body.get("choices").is_some() {
                Err(GeneratorError::EmptyBatch)
            } else {
                Err(GeneratorError::Malformed(
                    "response has no `choices` array".into(),
                ))
            }
        }
        Some(other) => Err(GeneratorError::Malformed(format!(
            "message content is not text: {other}"
        ))),
    }
}
