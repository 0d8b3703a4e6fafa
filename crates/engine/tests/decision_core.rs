//! Decision core scenarios: verdict rule, cooldown, failure handling.

mod common;

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use common::*;
use millguard_core::notification::NotificationKind;
use millguard_core::reading::SensorReading;
use millguard_db::{StateKey, StateStore};
use millguard_engine::{
    AlertBookkeeping, DecisionCore, MonitorConfig, MonitorError, StoreFailurePolicy,
};
use millguard_events::{ChannelOutcome, Dispatcher, NotificationChannel};

fn overheating_key() -> StateKey {
    StateKey::fault_alert("Overheating")
}

// ---------------------------------------------------------------------------
// Verdict rule
// ---------------------------------------------------------------------------

// Test: normal probability at the threshold wins over a dominant fault
#[tokio::test]
async fn normal_override_beats_dominant_fault() {
    let h = Harness::new(&[0.15, 0.80, 0.05]);

    let eval = h.core.evaluate_features(&features(), at(0)).await.unwrap();

    assert!(eval.result.class.is_normal());
    assert_eq!(eval.result.class.name, "Normal");
    assert!(!eval.notified);
    assert_eq!(h.channel.count(), 0);
    assert_eq!(h.store.get(&StateKey::fault_alert("Bearing Fault")).await.unwrap(), None);
}

// Test: the threshold comparison is inclusive
#[tokio::test]
async fn threshold_is_inclusive() {
    let h = Harness::new(&[0.14, 0.86, 0.0]);
    let eval = h.core.evaluate_features(&features(), at(0)).await.unwrap();
    assert!(eval.result.class.is_normal());
}

// Test: below the threshold, ties go to the lowest index
#[tokio::test]
async fn tie_goes_to_lowest_index() {
    let h = Harness::new(&[0.10, 0.45, 0.45]);

    let eval = h.core.evaluate_features(&features(), at(0)).await.unwrap();

    assert_eq!(eval.result.class.index, 1);
    assert_eq!(eval.result.class.name, "Bearing Fault");
    assert!(eval.notified);
}

// Test: a configured threshold replaces the default
#[tokio::test]
async fn threshold_is_configurable() {
    let config = MonitorConfig {
        normal_override_threshold: 0.5,
        ..MonitorConfig::default()
    };
    let h = Harness::with_config(&[0.15, 0.80, 0.05], config);

    let eval = h.core.evaluate_features(&features(), at(0)).await.unwrap();
    assert_eq!(eval.result.class.name, "Bearing Fault");
}

// Test: probabilities are returned unchanged in the result
#[tokio::test]
async fn result_carries_probabilities_and_time() {
    let h = Harness::new(&OVERHEATING);
    let eval = h.core.evaluate_features(&features(), at(42)).await.unwrap();
    assert_eq!(eval.result.probabilities, OVERHEATING.to_vec());
    assert_eq!(eval.result.timestamp, at(42));
}

// ---------------------------------------------------------------------------
// Cooldown
// ---------------------------------------------------------------------------

// Test: first qualifying evaluation dispatches and records the alert time
#[tokio::test]
async fn first_fault_dispatches_and_records() {
    let h = Harness::new(&OVERHEATING);

    let eval = h.core.evaluate_features(&features(), at(0)).await.unwrap();

    assert!(eval.notified);
    assert_eq!(eval.bookkeeping, AlertBookkeeping::Recorded);
    assert_eq!(h.channel.count(), 1);
    assert_matches!(
        &h.channel.kinds()[0],
        NotificationKind::FaultAlert { fault_class } if fault_class.name == "Overheating"
    );
    assert_eq!(h.store.get(&overheating_key()).await.unwrap(), Some(at(0)));
}

// Test: a second evaluation inside the cooldown never dispatches
#[tokio::test]
async fn second_fault_within_cooldown_is_suppressed() {
    let h = Harness::new(&OVERHEATING);

    h.core.evaluate_features(&features(), at(0)).await.unwrap();
    let eval = h.core.evaluate_features(&features(), at(599)).await.unwrap();

    assert!(!eval.notified);
    assert_eq!(eval.bookkeeping, AlertBookkeeping::CoolingDown { last_alert: at(0) });
    assert!(eval.report.is_none());
    assert_eq!(h.channel.count(), 1);
    assert_eq!(h.store.get(&overheating_key()).await.unwrap(), Some(at(0)));
}

// Test: after the cooldown the alert fires again and moves the timestamp
#[tokio::test]
async fn fault_after_cooldown_dispatches_again() {
    let h = Harness::new(&OVERHEATING);

    h.core.evaluate_features(&features(), at(0)).await.unwrap();
    let eval = h.core.evaluate_features(&features(), at(601)).await.unwrap();

    assert!(eval.notified);
    assert_eq!(h.channel.count(), 2);
    assert_eq!(h.store.get(&overheating_key()).await.unwrap(), Some(at(601)));
}

// Test: cooldowns are tracked per fault class
#[tokio::test]
async fn cooldown_is_per_fault_class() {
    let h = Harness::new(&OVERHEATING);
    h.core.evaluate_features(&features(), at(0)).await.unwrap();

    h.classifier.set(&BEARING);
    let eval = h.core.evaluate_features(&features(), at(10)).await.unwrap();

    assert!(eval.notified);
    assert_eq!(h.channel.count(), 2);
}

// Test: normal readings between faults do not reset the cooldown
#[tokio::test]
async fn normal_reading_does_not_touch_cooldown() {
    let h = Harness::new(&OVERHEATING);
    h.core.evaluate_features(&features(), at(0)).await.unwrap();

    h.classifier.set(&NORMAL);
    h.core.evaluate_features(&features(), at(100)).await.unwrap();

    h.classifier.set(&OVERHEATING);
    let eval = h.core.evaluate_features(&features(), at(200)).await.unwrap();
    assert!(!eval.notified);
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

// Test: a reading with a missing value fails before classification
#[tokio::test]
async fn incomplete_reading_is_invalid_input() {
    let h = Harness::new(&OVERHEATING);
    let reading: SensorReading = serde_json::from_value(serde_json::json!({
        "Vibration": 0.5,
        "Temperature": 70.0,
        "Pressure": 1.0,
        "RMS_Vibration": 0.4
    }))
    .unwrap();

    let err = h.core.evaluate(&reading, at(0)).await.unwrap_err();

    assert_matches!(err, MonitorError::InvalidInput(msg) if msg.contains("Mean_Temp"));
    assert_eq!(h.classifier.calls(), 0);
    assert_eq!(h.channel.count(), 0);
}

// Test: numeric strings are accepted like numbers
#[tokio::test]
async fn string_values_are_accepted() {
    let h = Harness::new(&NORMAL);
    let reading: SensorReading = serde_json::from_value(serde_json::json!({
        "Vibration": "0.5",
        "Temperature": "70.2",
        "Pressure": 1.0,
        "RMS_Vibration": "0.4",
        "Mean_Temp": 68
    }))
    .unwrap();

    let eval = h.core.evaluate(&reading, at(0)).await.unwrap();
    assert!(eval.result.class.is_normal());
}

// Test: classifier failure propagates without mutation
#[tokio::test]
async fn classifier_failure_is_classification_unavailable() {
    let h = Harness::new(&OVERHEATING);
    h.classifier.fail("model file corrupted");

    let err = h.core.evaluate_features(&features(), at(0)).await.unwrap_err();

    assert_matches!(err, MonitorError::ClassificationUnavailable(_));
    assert_eq!(h.channel.count(), 0);
    assert_eq!(h.store.get(&overheating_key()).await.unwrap(), None);
}

// Test: a non-finite probability is treated as a classifier failure
#[tokio::test]
async fn nan_probability_is_classification_unavailable() {
    let h = Harness::new(&[f64::NAN, 0.5, 0.5]);
    assert_matches!(
        h.core.evaluate_features(&features(), at(0)).await,
        Err(MonitorError::ClassificationUnavailable(_))
    );
}

// Test: store read failure still alerts under the default policy
#[tokio::test]
async fn store_outage_prefers_alert_by_default() {
    let h = Harness::new(&OVERHEATING);
    h.store.fail_reads(true);

    let eval = h.core.evaluate_features(&features(), at(0)).await.unwrap();

    assert!(eval.notified);
    assert_matches!(eval.bookkeeping, AlertBookkeeping::StoreUnavailable(_));
    assert_eq!(h.channel.count(), 1);
}

// Test: store write failure still alerts under the default policy
#[tokio::test]
async fn store_write_failure_prefers_alert() {
    let h = Harness::new(&OVERHEATING);
    h.store.fail_writes(true);

    let eval = h.core.evaluate_features(&features(), at(0)).await.unwrap();

    assert!(eval.notified);
    assert_eq!(h.channel.count(), 1);
}

// Test: prefer-silence policy suppresses alerts on store outage
#[tokio::test]
async fn store_outage_with_prefer_silence_suppresses() {
    let config = MonitorConfig {
        store_failure_policy: StoreFailurePolicy::PreferSilence,
        ..MonitorConfig::default()
    };
    let h = Harness::with_config(&OVERHEATING, config);
    h.store.fail_reads(true);

    let eval = h.core.evaluate_features(&features(), at(0)).await.unwrap();

    assert!(!eval.notified);
    assert_matches!(eval.bookkeeping, AlertBookkeeping::StoreUnavailable(_));
    assert_eq!(h.channel.count(), 0);
}

// ---------------------------------------------------------------------------
// Dispatch isolation
// ---------------------------------------------------------------------------

// Test: a failing channel does not block others or the bookkeeping
#[tokio::test]
async fn failing_channel_does_not_affect_bookkeeping() {
    let store = FlakyStore::new();
    let sms = RecordingChannel::new("sms");
    let channels: Vec<Arc<dyn NotificationChannel>> = vec![
        Arc::new(FailingChannel("email")),
        sms.clone(),
        Arc::new(HangingChannel("voice")),
    ];
    let core = DecisionCore::new(
        MonitorConfig::default(),
        ScriptedClassifier::new(&OVERHEATING),
        store.clone(),
        Dispatcher::new(channels, Duration::from_millis(50)),
    );

    let eval = core.evaluate_features(&features(), at(0)).await.unwrap();

    assert!(eval.notified);
    let report = eval.report.unwrap();
    assert_matches!(report.outcome("email"), Some(ChannelOutcome::Failed { .. }));
    assert_eq!(report.outcome("sms"), Some(&ChannelOutcome::Delivered));
    assert_eq!(report.outcome("voice"), Some(&ChannelOutcome::TimedOut));
    assert_eq!(sms.count(), 1);
    assert_eq!(store.get(&overheating_key()).await.unwrap(), Some(at(0)));
}

// Test: even when every channel fails the alert counts as sent
#[tokio::test]
async fn all_channels_failing_still_starts_cooldown() {
    let store = FlakyStore::new();
    let channels: Vec<Arc<dyn NotificationChannel>> = vec![Arc::new(FailingChannel("email"))];
    let core = DecisionCore::new(
        MonitorConfig::default(),
        ScriptedClassifier::new(&OVERHEATING),
        store.clone(),
        Dispatcher::new(channels, Duration::from_secs(1)),
    );

    let first = core.evaluate_features(&features(), at(0)).await.unwrap();
    assert!(first.notified);
    assert!(first.report.unwrap().all_failed());

    let second = core.evaluate_features(&features(), at(60)).await.unwrap();
    assert!(!second.notified);
}
