#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use millguard_api::config::ServerConfig;
use millguard_api::router::build_app_router;
use millguard_api::state::AppState;
use millguard_core::notification::NotificationRequest;
use millguard_core::reading::FeatureVector;
use millguard_db::{InMemoryStateStore, StateStore};
use millguard_engine::{
    ClassifierError, DecisionCore, MaintenanceScheduler, MonitorConfig, ScaleAndClassify,
};
use millguard_events::{ChannelError, Delivery, Dispatcher, NotificationChannel};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        maintenance_check_interval_secs: 600,
        model_path: "model.json".to_string(),
        database_url: None,
    }
}

/// Classifier returning a fixed probability vector, or an error when empty.
pub struct StubClassifier(Mutex<Vec<f64>>);

impl StubClassifier {
    pub fn new(probs: &[f64]) -> Arc<Self> {
        Arc::new(Self(Mutex::new(probs.to_vec())))
    }

    pub fn set(&self, probs: &[f64]) {
        *self.0.lock().unwrap() = probs.to_vec();
    }
}

#[async_trait]
impl ScaleAndClassify for StubClassifier {
    async fn predict_proba(&self, _features: &FeatureVector) -> Result<Vec<f64>, ClassifierError> {
        let probs = self.0.lock().unwrap().clone();
        if probs.is_empty() {
            return Err(ClassifierError::Model("model not loaded".into()));
        }
        Ok(probs)
    }
}

/// Counts deliveries.
pub struct CountingChannel(AtomicUsize);

impl CountingChannel {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationChannel for CountingChannel {
    fn name(&self) -> &str {
        "email"
    }

    async fn send(&self, _request: &NotificationRequest) -> Result<Delivery, ChannelError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(Delivery::Sent)
    }
}

pub struct TestApp {
    pub router: Router,
    pub classifier: Arc<StubClassifier>,
    pub channel: Arc<CountingChannel>,
    pub store: Arc<InMemoryStateStore>,
}

/// Build the full application router over an in-memory store.
///
/// Uses the same middleware stack as production via `build_app_router`.
pub fn build_test_app(probs: &[f64]) -> TestApp {
    let monitor = MonitorConfig::default();
    let classifier = StubClassifier::new(probs);
    let channel = Arc::new(CountingChannel(AtomicUsize::new(0)));
    let store = Arc::new(InMemoryStateStore::new());

    let channels: Vec<Arc<dyn NotificationChannel>> = vec![channel.clone()];
    let dispatcher = Dispatcher::new(channels, Duration::from_secs(5));
    let dyn_store: Arc<dyn StateStore> = store.clone();

    let state = AppState {
        decision: Arc::new(DecisionCore::new(
            monitor.clone(),
            classifier.clone(),
            Arc::clone(&dyn_store),
            dispatcher.clone(),
        )),
        maintenance: Arc::new(MaintenanceScheduler::new(
            monitor,
            Arc::clone(&dyn_store),
            dispatcher,
        )),
        store: dyn_store,
        config: Arc::new(test_config()),
    };

    TestApp {
        router: build_app_router(state, &test_config()),
        classifier,
        channel,
        store,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    post_raw(app, uri, body.to_string()).await
}

pub async fn post_raw(app: Router, uri: &str, body: String) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
