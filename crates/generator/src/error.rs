use thiserror::Error;

/// Why a generator could not produce a usable batch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeneratorError {
    /// Connection, TLS, or timeout failure talking to the provider.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The provider answered with a non-success status.
    #[error("provider returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
    /// The response could not be turned into jokes.
    #[error("malformed generator output: {0}")]
    Malformed(String),
    /// The response parsed but held no jokes.
    #[error("generator returned no jokes")]
    EmptyBatch,
    #[error("invalid generator config: {0}")]
    InvalidConfig(String),
}

impl GeneratorError {
    /// Transient failures worth another attempt: transport errors, 408, 429 and 5xx.
    pub fn is_retryable(&self) -> bool {
        match self {
            GeneratorError::Transport(_) => true,
            GeneratorError::Http { status, .. } => {
                matches!(*status, 408 | 429) || (500..=599).contains(status)
            }
            GeneratorError::Malformed(_)
            | GeneratorError::EmptyBatch
            | GeneratorError::InvalidConfig(_) => false,
        }
    }
}

impl From<reqwest::Error> for GeneratorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GeneratorError::Malformed(format!("response body: {err}"))
        } else {
            GeneratorError::Transport(err.to_string())
        }
    }
}
