//! Shared test doubles for engine integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use millguard_core::notification::{NotificationKind, NotificationRequest};
use millguard_core::reading::FeatureVector;
use millguard_core::types::Timestamp;
use millguard_db::{InMemoryStateStore, StateKey, StateStore, StoreError};
use millguard_engine::{
    ClassifierError, DecisionCore, MaintenanceScheduler, MonitorConfig, ScaleAndClassify,
};
use millguard_events::{ChannelError, Delivery, Dispatcher, NotificationChannel};

pub const BEARING: [f64; 3] = [0.05, 0.90, 0.05];
pub const OVERHEATING: [f64; 3] = [0.10, 0.20, 0.70];
pub const NORMAL: [f64; 3] = [0.80, 0.10, 0.10];

/// Fixed instant offset by `secs`.
pub fn at(secs: i64) -> Timestamp {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

pub fn features() -> FeatureVector {
    FeatureVector::new([0.52, 71.3, 1.01, 0.37, 69.8]).unwrap()
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// Returns whatever probabilities were last scripted, or an error.
pub struct ScriptedClassifier {
    probs: Mutex<Result<Vec<f64>, String>>,
    calls: AtomicUsize,
}

impl ScriptedClassifier {
    pub fn new(probs: &[f64]) -> Arc<Self> {
        Arc::new(Self {
            probs: Mutex::new(Ok(probs.to_vec())),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn set(&self, probs: &[f64]) {
        *self.probs.lock().unwrap() = Ok(probs.to_vec());
    }

    pub fn fail(&self, message: &str) {
        *self.probs.lock().unwrap() = Err(message.to_string());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScaleAndClassify for ScriptedClassifier {
    async fn predict_proba(&self, _features: &FeatureVector) -> Result<Vec<f64>, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.probs
            .lock()
            .unwrap()
            .clone()
            .map_err(ClassifierError::Model)
    }
}

// ---------------------------------------------------------------------------
// Channels
// ---------------------------------------------------------------------------

/// Records every request it receives.
pub struct RecordingChannel {
    name: &'static str,
    delay: Duration,
    sent: Mutex<Vec<NotificationRequest>>,
}

impl RecordingChannel {
    pub fn new(name: &'static str) -> Arc<Self> {
        Self::with_delay(name, Duration::ZERO)
    }

    pub fn with_delay(name: &'static str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            name,
            delay,
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn kinds(&self) -> Vec<NotificationKind> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.kind.clone())
            .collect()
    }
}

#[async_trait]
impl NotificationChannel for RecordingChannel {
    fn name(&self) -> &str {
        self.name
    }

    async fn send(&self, request: &NotificationRequest) -> Result<Delivery, ChannelError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.sent.lock().unwrap().push(request.clone());
        Ok(Delivery::Sent)
    }
}

pub struct FailingChannel(pub &'static str);

#[async_trait]
impl NotificationChannel for FailingChannel {
    fn name(&self) -> &str {
        self.0
    }

    async fn send(&self, _request: &NotificationRequest) -> Result<Delivery, ChannelError> {
        Err(ChannelError::Other("gateway rejected message".into()))
    }
}

pub struct HangingChannel(pub &'static str);

#[async_trait]
impl NotificationChannel for HangingChannel {
    fn name(&self) -> &str {
        self.0
    }

    async fn send(&self, _request: &NotificationRequest) -> Result<Delivery, ChannelError> {
        std::future::pending::<()>().await;
        Ok(Delivery::Sent)
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// In-memory store that can be switched into a failing mode per operation.
#[derive(Default)]
pub struct FlakyStore {
    inner: InMemoryStateStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_reads(&self, on: bool) {
        self.fail_reads.store(on, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, on: bool) {
        self.fail_writes.store(on, Ordering::SeqCst);
    }

    fn check(&self, flag: &AtomicBool) -> Result<(), StoreError> {
        if flag.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("connection refused".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl StateStore for FlakyStore {
    async fn get(&self, key: &StateKey) -> Result<Option<Timestamp>, StoreError> {
        self.check(&self.fail_reads)?;
        self.inner.get(key).await
    }

    async fn compare_and_set(
        &self,
        key: &StateKey,
        expected: Option<Timestamp>,
        new: Timestamp,
    ) -> Result<bool, StoreError> {
        self.check(&self.fail_writes)?;
        self.inner.compare_and_set(key, expected, new).await
    }

    async fn put(&self, key: &StateKey, value: Timestamp) -> Result<(), StoreError> {
        self.check(&self.fail_writes)?;
        self.inner.put(key, value).await
    }

    async fn remove(&self, key: &StateKey) -> Result<(), StoreError> {
        self.check(&self.fail_writes)?;
        self.inner.remove(key).await
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct Harness {
    pub core: Arc<DecisionCore>,
    pub scheduler: Arc<MaintenanceScheduler>,
    pub classifier: Arc<ScriptedClassifier>,
    pub store: Arc<FlakyStore>,
    pub channel: Arc<RecordingChannel>,
}

impl Harness {
    pub fn new(probs: &[f64]) -> Self {
        Self::with_config(probs, MonitorConfig::default())
    }

    pub fn with_config(probs: &[f64], config: MonitorConfig) -> Self {
        let classifier = ScriptedClassifier::new(probs);
        let store = FlakyStore::new();
        let channel = RecordingChannel::new("email");
        let channels: Vec<Arc<dyn NotificationChannel>> = vec![channel.clone()];
        let dispatcher = Dispatcher::new(channels, config.channel_timeout);

        let core = Arc::new(DecisionCore::new(
            config.clone(),
            classifier.clone(),
            store.clone(),
            dispatcher.clone(),
        ));
        let scheduler = Arc::new(MaintenanceScheduler::new(config, store.clone(), dispatcher));

        Self {
            core,
            scheduler,
            classifier,
            store,
            channel,
        }
    }
}
