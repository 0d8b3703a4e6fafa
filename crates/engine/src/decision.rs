//! Decision core: classify one reading and decide whether to alert.
//!
//! Flow for one evaluation:
//!
//! 1. Validate the reading into a [`FeatureVector`].
//! 2. Scale and score it through the [`ScaleAndClassify`] port.
//! 3. Apply the normal-override threshold to pick the verdict.
//! 4. For a fault verdict, atomically claim the class's cooldown slot in the
//!    state store and dispatch a fault alert only if the claim succeeded.
//!
//! Input and classifier failures abort before any state is touched. Store
//! failures are governed by [`StoreFailurePolicy`](crate::StoreFailurePolicy).

use std::sync::Arc;

use millguard_core::classification::{classify, ClassificationResult};
use millguard_core::error::CoreError;
use millguard_core::notification::NotificationRequest;
use millguard_core::reading::{FeatureVector, SensorReading};
use millguard_core::schedule::cooldown_elapsed;
use millguard_core::types::Timestamp;
use millguard_db::{StateKey, StateStore};
use millguard_events::{DispatchReport, Dispatcher};

use crate::claim::{claim_slot, Claim};
use crate::classifier::ScaleAndClassify;
use crate::config::MonitorConfig;
use crate::error::MonitorError;

/// What happened to the cooldown bookkeeping during one evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertBookkeeping {
    /// Normal verdict; the store was not touched.
    NotConsulted,
    /// The alert timestamp was recorded and this evaluation dispatched.
    Recorded,
    /// An alert for this class went out too recently.
    CoolingDown { last_alert: Timestamp },
    /// A concurrent evaluation claimed the same cooldown slot first.
    LostRace,
    /// The store failed; the policy decided whether to dispatch.
    StoreUnavailable(String),
}

/// Result of one evaluation.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub result: ClassificationResult,
    /// `true` iff a dispatch was initiated, regardless of delivery outcome.
    pub notified: bool,
    pub report: Option<DispatchReport>,
    pub bookkeeping: AlertBookkeeping,
}

/// Turns sensor readings into classifications and rate-limited fault alerts.
pub struct DecisionCore {
    config: MonitorConfig,
    classifier: Arc<dyn ScaleAndClassify>,
    store: Arc<dyn StateStore>,
    dispatcher: Dispatcher,
}

impl DecisionCore {
    pub fn new(
        config: MonitorConfig,
        classifier: Arc<dyn ScaleAndClassify>,
        store: Arc<dyn StateStore>,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            config,
            classifier,
            store,
            dispatcher,
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Evaluate a raw sensor reading at `now`.
    pub async fn evaluate(
        &self,
        reading: &SensorReading,
        now: Timestamp,
    ) -> Result<Evaluation, MonitorError> {
        let features = reading.to_features().map_err(|e| match e {
            CoreError::Validation(msg) => MonitorError::InvalidInput(msg),
            other => MonitorError::InvalidInput(other.to_string()),
        })?;
        self.evaluate_features(&features, now).await
    }

    /// Evaluate an already validated feature vector at `now`.
    pub async fn evaluate_features(
        &self,
        features: &FeatureVector,
        now: Timestamp,
    ) -> Result<Evaluation, MonitorError> {
        let probabilities = self
            .classifier
            .predict_proba(features)
            .await
            .map_err(|e| MonitorError::ClassificationUnavailable(e.to_string()))?;

        let result = classify(
            &self.config.fault_classes,
            probabilities,
            self.config.normal_override_threshold,
            now,
        )
        .map_err(|e| MonitorError::ClassificationUnavailable(e.to_string()))?;

        if result.class.is_normal() {
            tracing::debug!(label = %result.class.name, "Reading classified as normal");
            return Ok(Evaluation {
                result,
                notified: false,
                report: None,
                bookkeeping: AlertBookkeeping::NotConsulted,
            });
        }

        let key = StateKey::fault_alert(result.class.name.clone());
        let claim = claim_slot(
            self.store.as_ref(),
            &key,
            now,
            self.config.fault_cooldown,
            cooldown_elapsed,
        )
        .await;

        let bookkeeping = match claim {
            Claim::Won => AlertBookkeeping::Recorded,
            Claim::Closed { last } => {
                tracing::debug!(
                    fault_class = %result.class.name,
                    last_alert = %last,
                    "Fault alert suppressed by cooldown"
                );
                AlertBookkeeping::CoolingDown { last_alert: last }
            }
            Claim::LostRace => {
                tracing::debug!(
                    fault_class = %result.class.name,
                    "Concurrent evaluation already claimed this alert"
                );
                AlertBookkeeping::LostRace
            }
            Claim::StoreUnavailable(e) => {
                tracing::warn!(
                    fault_class = %result.class.name,
                    policy = ?self.config.store_failure_policy,
                    error = %e,
                    "Cooldown bookkeeping unavailable"
                );
                AlertBookkeeping::StoreUnavailable(e.to_string())
            }
        };

        let dispatch = match &bookkeeping {
            AlertBookkeeping::Recorded => true,
            AlertBookkeeping::StoreUnavailable(_) => {
                self.config.store_failure_policy.notify_on_store_failure()
            }
            _ => false,
        };

        if !dispatch {
            return Ok(Evaluation {
                result,
                notified: false,
                report: None,
                bookkeeping,
            });
        }

        tracing::info!(
            fault_class = %result.class.name,
            probability = result.probabilities[result.class.index],
            "Dispatching fault alert"
        );
        let request = NotificationRequest::fault_alert(result.class.clone(), now);
        let report = self.dispatcher.dispatch(&request).await;

        Ok(Evaluation {
            result,
            notified: true,
            report: Some(report),
            bookkeeping,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
