//! Periodic preventive-maintenance check.
//!
//! Runs [`MaintenanceScheduler::check`] on a fixed interval using
//! `tokio::time::interval`. A failed check is logged and the loop carries on
//! with the next tick.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use millguard_engine::MaintenanceScheduler;
use tokio_util::sync::CancellationToken;

/// Run the maintenance check loop until `cancel` is triggered.
///
/// The first check runs immediately.
pub async fn run(scheduler: Arc<MaintenanceScheduler>, every: Duration, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = every.as_secs(),
        "Maintenance check job started"
    );

    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Maintenance check job stopping");
                break;
            }
            _ = interval.tick() => {
                match scheduler.check(Utc::now()).await {
                    Ok(status) if status.alert_sent => {
                        tracing::info!(
                            last_maintenance = ?status.last_maintenance,
                            "Maintenance check: reminder sent"
                        );
                    }
                    Ok(status) => {
                        tracing::debug!(due = status.due, "Maintenance check: no reminder");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Maintenance check failed");
                    }
                }
            }
        }
    }
}
