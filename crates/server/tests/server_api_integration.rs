//! HTTP-level tests for the serve, prime and diagnostics routes.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use generator::{ContentGenerator, GeneratorError, Joke, StubGenerator};
use http_body_util::BodyExt;
use inventory::InventoryStore;
use jokepool::{ReplenishPolicy, Replenisher};
use serde_json::{json, Value};
use server::{build_router, QueuedTrigger, ReplenishTrigger, ServerConfig, ServerState};
use tower::ServiceExt;

#[derive(Default)]
struct CountingTrigger {
    fired: AtomicUsize,
}

impl ReplenishTrigger for CountingTrigger {
    fn fire(&self) {
        self.fired.fetch_add(1, Ordering::SeqCst);
    }
}

struct BrokenGenerator;

#[async_trait]
impl ContentGenerator for BrokenGenerator {
    async fn generate(&self, _topic: &str, _count: usize) -> Result<Vec<Joke>, GeneratorError> {
        Err(GeneratorError::Transport("connection refused".into()))
    }

    fn name(&self) -> &str {
        "broken"
    }
}

fn replenisher(generator: Arc<dyn ContentGenerator>, policy: ReplenishPolicy) -> Replenisher {
    Replenisher::new(Arc::new(InventoryStore::in_memory()), generator, policy)
}

fn app_with(replenisher: Replenisher, trigger: Arc<dyn ReplenishTrigger>) -> Router {
    let state = ServerState::new(ServerConfig::default(), replenisher, trigger);
    build_router(Arc::new(state))
}

fn stub_app() -> (Router, Arc<CountingTrigger>, Arc<InventoryStore>) {
    let trigger = Arc::new(CountingTrigger::default());
    let replenisher = replenisher(Arc::new(StubGenerator::new()), ReplenishPolicy::default());
    let store = replenisher.store().clone();
    (app_with(replenisher, trigger.clone()), trigger, store)
}

async fn call(app: &Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, body)
}

#[tokio::test]
async fn empty_pool_returns_joke_not_found() {
    let (app, trigger, _) = stub_app();

    let (status, body) = call(&app, Method::GET, "/api/v1/joke").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({ "error": { "code": "JOKE_NOT_FOUND", "message": "Joke not found" } })
    );
    assert_eq!(trigger.fired.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn prime_then_serve() {
    let (app, trigger, store) = stub_app();

    let (status, body) = call(&app, Method::POST, "/api/v1/joke").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["method"], "POST");
    assert_eq!(body["item"]["message"], "Jokes added");
    assert_eq!(body["item"]["outcome"]["status"], "added");
    assert_eq!(body["item"]["outcome"]["inserted"], 10);

    let (status, body) = call(&app, Method::GET, "/api/v1/joke").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["method"], "GET");
    assert!(body["item"]["joke"]["setup"].is_string());
    assert!(body["item"]["joke"]["punchline"].is_string());

    assert_eq!(trigger.fired.load(Ordering::SeqCst), 1);
    assert_eq!(store.count().await.unwrap(), 9);
}

#[tokio::test]
async fn second_prime_reports_already_present() {
    let (app, _, _) = stub_app();

    call(&app, Method::POST, "/api/v1/joke").await;
    let (status, body) = call(&app, Method::POST, "/api/v1/joke").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["item"]["message"], "Jokes already present");
    assert_eq!(body["item"]["outcome"]["status"], "skipped");
    assert_eq!(body["item"]["outcome"]["reason"], "pool_sufficient");
    assert_eq!(body["item"]["outcome"]["count"], 10);
}

#[tokio::test]
async fn prime_with_failing_generator_is_degraded_not_an_error() {
    let replenisher = replenisher(Arc::new(BrokenGenerator), ReplenishPolicy::default());
    let store = replenisher.store().clone();
    let app = app_with(replenisher, Arc::new(server::NoopTrigger));

    let (status, body) = call(&app, Method::POST, "/api/v1/joke").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["item"]["message"], "Joke generation degraded");
    assert_eq!(body["item"]["outcome"]["status"], "degraded");
    assert!(!store.is_fetching().await.unwrap());
}

#[tokio::test]
async fn served_jokes_never_repeat() {
    let (app, _, _) = stub_app();
    call(&app, Method::POST, "/api/v1/joke").await;

    let mut seen = HashSet::new();
    for _ in 0..10 {
        let (status, body) = call(&app, Method::GET, "/api/v1/joke").await;
        assert_eq!(status, StatusCode::OK);
        assert!(seen.insert(body["item"]["joke"].to_string()));
    }

    let (status, _) = call(&app, Method::GET, "/api/v1/joke").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn pool_status_reports_count_and_lease() {
    let (app, _, store) = stub_app();
    call(&app, Method::POST, "/api/v1/joke").await;
    assert!(store
        .try_acquire_fetch_lock(Duration::from_secs(5))
        .await
        .unwrap());

    let (status, body) = call(&app, Method::GET, "/api/v1/pool").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["item"]["backend"], "in_memory");
    assert_eq!(body["item"]["count"], 10);
    assert_eq!(body["item"]["is_fetching"], true);
    assert_eq!(body["item"]["low_water_mark"], 5);
}

#[tokio::test]
async fn serving_drives_background_replenishment() {
    let policy = ReplenishPolicy {
        low_water_mark: 20,
        ..Default::default()
    };
    let replenisher = replenisher(Arc::new(StubGenerator::new()), policy);
    let store = replenisher.store().clone();
    let (trigger, _worker) = QueuedTrigger::spawn(replenisher.clone(), 1);
    let app = app_with(replenisher, Arc::new(trigger));

    call(&app, Method::POST, "/api/v1/joke").await;
    let (status, _) = call(&app, Method::GET, "/api/v1/joke").await;
    assert_eq!(status, StatusCode::OK);

    for _ in 0..100 {
        if store.count().await.unwrap() == 19 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("background replenishment never ran");
}

#[tokio::test]
async fn health_ready_and_fallback() {
    let (app, _, _) = stub_app();

    let (status, body) = call(&app, Method::GET, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = call(&app, Method::GET, "/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["components"]["store"], "in_memory");
    assert_eq!(body["components"]["pool_size"], 0);

    let (status, body) = call(&app, Method::GET, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "jokepool");

    let (status, body) = call(&app, Method::GET, "/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn request_id_is_echoed_or_generated() {
    let (app, _, _) = stub_app();

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "abc-123")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "abc-123");

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let generated = response.headers()["x-request-id"].to_str().unwrap();
    assert_eq!(generated.len(), 36);
}

#[tokio::test]
async fn metrics_endpoint_respects_config() {
    let replenisher = replenisher(Arc::new(StubGenerator::new()), ReplenishPolicy::default());
    let config = ServerConfig {
        metrics_enabled: false,
        ..Default::default()
    };
    let state = ServerState::new(config, replenisher.clone(), Arc::new(server::NoopTrigger));
    let app = build_router(Arc::new(state));

    let (status, body) = call(&app, Method::GET, "/metrics").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "METRICS_DISABLED");

    // Enabled without an installed recorder renders an empty exposition.
    let app = app_with(replenisher, Arc::new(server::NoopTrigger));
    let (status, body) = call(&app, Method::GET, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);
}
