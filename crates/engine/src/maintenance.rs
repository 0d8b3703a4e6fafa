//! Preventive maintenance: due check, reminder suppression and service log.

use std::sync::Arc;

use millguard_core::notification::NotificationRequest;
use millguard_core::schedule::{maintenance_alert_needed, maintenance_due};
use millguard_core::types::Timestamp;
use millguard_db::{StateKey, StateStore};
use millguard_events::{DispatchReport, Dispatcher};
use serde::Serialize;

use crate::claim::{claim_slot, Claim};
use crate::config::MonitorConfig;
use crate::error::MonitorError;

/// Outcome of one maintenance check.
#[derive(Debug, Clone, Serialize)]
pub struct MaintenanceStatus {
    /// Maintenance has never been recorded or is older than the interval.
    pub due: bool,
    /// This check dispatched a reminder.
    pub alert_sent: bool,
    pub last_maintenance: Option<Timestamp>,
    #[serde(skip)]
    pub report: Option<DispatchReport>,
}

pub struct MaintenanceScheduler {
    config: MonitorConfig,
    store: Arc<dyn StateStore>,
    dispatcher: Dispatcher,
}

impl MaintenanceScheduler {
    pub fn new(config: MonitorConfig, store: Arc<dyn StateStore>, dispatcher: Dispatcher) -> Self {
        Self {
            config,
            store,
            dispatcher,
        }
    }

    /// Decide whether maintenance is due and send at most one reminder per
    /// suppression window.
    ///
    /// Store failures follow the configured
    /// [`StoreFailurePolicy`](crate::StoreFailurePolicy). When the last
    /// maintenance time cannot be read, `PreferAlert` treats maintenance as
    /// due and `PreferSilence` fails the check.
    pub async fn check(&self, now: Timestamp) -> Result<MaintenanceStatus, MonitorError> {
        let (last_maintenance, due) =
            match self.store.get(&StateKey::MaintenanceLastPerformed).await {
                Ok(last) => (
                    last,
                    maintenance_due(last, now, self.config.maintenance_interval),
                ),
                Err(e) if self.config.store_failure_policy.notify_on_store_failure() => {
                    tracing::warn!(
                        policy = ?self.config.store_failure_policy,
                        error = %e,
                        "Last maintenance time unavailable, treating maintenance as due"
                    );
                    (None, true)
                }
                Err(e) => return Err(e.into()),
            };

        if !due {
            return Ok(MaintenanceStatus {
                due,
                alert_sent: false,
                last_maintenance,
                report: None,
            });
        }

        let claim = claim_slot(
            self.store.as_ref(),
            &StateKey::MaintenanceLastAlert,
            now,
            self.config.maintenance_alert_suppression,
            maintenance_alert_needed,
        )
        .await;

        let send = match claim {
            Claim::Won => true,
            Claim::Closed { last } => {
                tracing::debug!(last_alert = %last, "Maintenance reminder suppressed");
                false
            }
            Claim::LostRace => {
                tracing::debug!("Concurrent check already sent the maintenance reminder");
                false
            }
            Claim::StoreUnavailable(e) => {
                tracing::warn!(
                    policy = ?self.config.store_failure_policy,
                    error = %e,
                    "Maintenance reminder bookkeeping unavailable"
                );
                self.config.store_failure_policy.notify_on_store_failure()
            }
        };

        let report = if send {
            tracing::info!(
                last_maintenance = ?last_maintenance,
                "Maintenance overdue, dispatching reminder"
            );
            Some(
                self.dispatcher
                    .dispatch(&NotificationRequest::maintenance_due(now))
                    .await,
            )
        } else {
            None
        };

        Ok(MaintenanceStatus {
            due,
            alert_sent: send,
            last_maintenance,
            report,
        })
    }

    /// Record that maintenance was performed at `now`.
    ///
    /// The reminder timestamp is kept unless
    /// [`MonitorConfig::reset_suppression_on_maintenance`] is set.
    pub async fn record_maintenance_performed(&self, now: Timestamp) -> Result<(), MonitorError> {
        self.store
            .put(&StateKey::MaintenanceLastPerformed, now)
            .await?;

        if self.config.reset_suppression_on_maintenance {
            self.store.remove(&StateKey::MaintenanceLastAlert).await?;
        }

        tracing::info!(performed_at = %now, "Maintenance recorded");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
