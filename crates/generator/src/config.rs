use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::retry::RetryConfig;
use crate::GeneratorError;

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Runtime configuration for the content generator.
///
/// # Example
/// ```
/// use generator::GeneratorConfig;
///
/// let cfg = GeneratorConfig {
///     mode: "openai".into(),
///     api_key: Some("sk-test".into()),
///     ..Default::default()
/// };
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneratorConfig {
    /// `"openai"` (remote chat completions) or `"stub"` (deterministic, offline).
    pub mode: String,
    /// Chat-completions endpoint.
    pub api_url: String,
    /// Bearer token. Never serialized back out.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_config: Option<RetryConfig>,
    /// Retry transient provider failures.
    pub enable_resilience: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            mode: "openai".into(),
            api_url: DEFAULT_API_URL.into(),
            api_key: None,
            model: "gpt-4o-mini".into(),
            temperature: 0.7,
            timeout_secs: 30,
            connect_timeout_secs: 10,
            retry_config: None,
            enable_resilience: true,
        }
    }
}

impl fmt::Debug for GeneratorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorConfig")
            .field("mode", &self.mode)
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("retry_config", &self.retry_config)
            .field("enable_resilience", &self.enable_resilience)
            .finish()
    }
}

impl GeneratorConfig {
    pub fn stub() -> Self {
        Self {
            mode: "stub".into(),
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), GeneratorError> {
        match self.mode.as_str() {
            "stub" => Ok(()),
            "openai" => {
                if self.api_url.trim().is_empty() {
                    return Err(GeneratorError::InvalidConfig(
                        "api_url is required for openai mode".into(),
                    ));
                }
                if self.api_key.as_deref().is_none_or(|k| k.trim().is_empty()) {
                    return Err(GeneratorError::InvalidConfig(
                        "api_key is required for openai mode".into(),
                    ));
                }
                if !(0.0..=2.0).contains(&self.temperature) {
                    return Err(GeneratorError::InvalidConfig(format!(
                        "temperature must be within 0.0..=2.0, got {}",
                        self.temperature
                    )));
                }
                if self.timeout_secs == 0 {
                    return Err(GeneratorError::InvalidConfig(
                        "timeout_secs must be greater than zero".into(),
                    ));
                }
                Ok(())
            }
            other => Err(GeneratorError::InvalidConfig(format!(
                "unknown generator mode '{other}' (expected 'openai' or 'stub')"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_openai_chat() {
        let cfg = GeneratorConfig::default();
        assert_eq!(cfg.mode, "openai");
        assert_eq!(cfg.model, "gpt-4o-mini");
        assert!((cfg.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(cfg.api_url, DEFAULT_API_URL);
        assert!(cfg.enable_resilience);
    }

    #[test]
    fn openai_requires_api_key() {
        let cfg = GeneratorConfig::default();
        assert!(matches!(
            cfg.validate(),
            Err(GeneratorError::InvalidConfig(_))
        ));
        let cfg = GeneratorConfig {
            api_key: Some("sk-test".into()),
            ..Default::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn stub_needs_nothing_and_unknown_mode_fails() {
        assert!(GeneratorConfig::stub().validate().is_ok());
        let cfg = GeneratorConfig {
            mode: "llama".into(),
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn api_key_never_serialized_or_debug_printed() {
        let cfg = GeneratorConfig {
            api_key: Some("sk-very-secret".into()),
            ..Default::default()
        };
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(!json.contains("sk-very-secret"));
        assert!(!format!("{cfg:?}").contains("sk-very-secret"));
    }

    #[test]
    fn partial_deserialize_fills_defaults() {
        let cfg: GeneratorConfig =
            serde_json::from_str(r#"{"mode":"stub","temperature":1.1}"#).unwrap();
        assert_eq!(cfg.mode, "stub");
        assert!((cfg.temperature - 1.1).abs() < f32::EPSILON);
        assert_eq!(cfg.model, "gpt-4o-mini");
    }
}
