use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::State;
use axum::http::Method;
use axum::response::IntoResponse;
use axum::Json;
use jokepool::ReplenishOutcome;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Wrap a payload as `{ "item": .., "method": .. }`.
fn envelope(method: &Method, item: Value) -> Json<Value> {
    Json(json!({ "item": item, "method": method.as_str() }))
}

/// Serve one joke (GET /api/v1/joke)
///
/// The joke is removed from the pool. A background replenishment is
/// requested afterwards; its outcome never affects this response.
///
/// ```json
/// { "item": { "joke": { "setup": "...", "punchline": "..." } }, "method": "GET" }
/// ```
pub async fn serve_joke(
    State(state): State<Arc<ServerState>>,
    method: Method,
) -> ServerResult<impl IntoResponse> {
    let Some(joke) = state.store().take_random().await? else {
        metrics::counter!("jokepool_pool_empty_total").increment(1);
        return Err(ServerError::JokeNotFound);
    };

    metrics::counter!("jokepool_jokes_served_total").increment(1);
    state.trigger.fire();

    Ok(envelope(&method, json!({ "joke": joke })))
}

/// Run a replenishment and wait for it (POST /api/v1/joke)
///
/// Jokes always come from the configured generator; the request body is
/// ignored.
pub async fn prime_jokes(
    State(state): State<Arc<ServerState>>,
    method: Method,
) -> ServerResult<impl IntoResponse> {
    let outcome = state.replenisher.run().await?;
    Ok(envelope(
        &method,
        json!({ "message": prime_message(&outcome), "outcome": outcome }),
    ))
}

fn prime_message(outcome: &ReplenishOutcome) -> &'static str {
    match outcome {
        ReplenishOutcome::Added { .. } => "Jokes added",
        // `outcome.reason` tells a full pool apart from a fetch in flight.
        ReplenishOutcome::Skipped(_) => "Jokes already present",
        ReplenishOutcome::Degraded { .. } => "Joke generation degraded",
    }
}

#[derive(Debug, Serialize)]
pub struct PoolStatus {
    pub backend: &'static str,
    pub count: usize,
    pub is_fetching: bool,
    pub low_water_mark: usize,
}

/// Pool diagnostics (GET /api/v1/pool)
///
/// `is_fetching` is an observation only; it may change before the
/// response arrives.
pub async fn pool_status(
    State(state): State<Arc<ServerState>>,
    method: Method,
) -> ServerResult<impl IntoResponse> {
    let store = state.store();
    let status = PoolStatus {
        backend: store.backend_name(),
        count: store.count().await?,
        is_fetching: store.is_fetching().await?,
        low_water_mark: state.replenisher.policy().low_water_mark,
    };
    Ok(envelope(&method, json!(status)))
}
