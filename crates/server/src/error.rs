use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The pool is empty. A normal condition, not a fault.
    #[error("Joke not found")]
    JokeNotFound,

    #[error("Store unavailable: {0}")]
    Store(#[from] inventory::InventoryError),

    #[error("Setup error: {0}")]
    Setup(#[from] jokepool::SetupError),

    #[error("Metrics are disabled")]
    MetricsDisabled,

    #[error("Not found")]
    NotFound,
}

/// API error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ServerError {
    /// Get HTTP status code for this error
    fn status_code(&self) -> StatusCode {
        match self {
            ServerError::JokeNotFound | ServerError::NotFound | ServerError::MetricsDisabled => {
                StatusCode::NOT_FOUND
            }
            ServerError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::Setup(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code string
    fn error_code(&self) -> &'static str {
        match self {
            ServerError::JokeNotFound => "JOKE_NOT_FOUND",
            ServerError::Store(_) => "STORE_UNAVAILABLE",
            ServerError::Setup(_) => "SETUP_ERROR",
            ServerError::MetricsDisabled => "METRICS_DISABLED",
            ServerError::NotFound => "NOT_FOUND",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.to_string(),
            },
        });

        (status, body).into_response()
    }
}
