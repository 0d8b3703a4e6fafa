//! Time rules for fault-alert cooldowns and preventive maintenance.
//!
//! Pure logic. The caller reads the relevant timestamps from the state store
//! and passes them in together with `now`.

use std::time::Duration;

use crate::types::Timestamp;

/// Minimum interval between two alerts for the same fault class.
pub const DEFAULT_FAULT_COOLDOWN: Duration = Duration::from_secs(10 * 60);

/// Maintenance becomes due once this much time has passed since the last service.
pub const DEFAULT_MAINTENANCE_INTERVAL: Duration = Duration::from_secs(3 * 24 * 3600);

/// Minimum interval between two maintenance-due alerts.
pub const DEFAULT_MAINTENANCE_ALERT_SUPPRESSION: Duration = Duration::from_secs(3 * 3600);

fn to_chrono(d: Duration) -> chrono::Duration {
    chrono::Duration::from_std(d).unwrap_or(chrono::Duration::MAX)
}

/// `true` when a fault alert may fire: no previous alert, or at least
/// `cooldown` has elapsed since it.
pub fn cooldown_elapsed(last_alert: Option<Timestamp>, now: Timestamp, cooldown: Duration) -> bool {
    match last_alert {
        None => true,
        Some(last) => now.signed_duration_since(last) >= to_chrono(cooldown),
    }
}

/// `true` when maintenance has never been recorded or the last service is
/// strictly older than `interval`.
pub fn maintenance_due(
    last_maintenance: Option<Timestamp>,
    now: Timestamp,
    interval: Duration,
) -> bool {
    match last_maintenance {
        None => true,
        Some(last) => now.signed_duration_since(last) > to_chrono(interval),
    }
}

/// `true` unless a maintenance alert was already sent within `window`.
pub fn maintenance_alert_needed(
    last_alert: Option<Timestamp>,
    now: Timestamp,
    window: Duration,
) -> bool {
    match last_alert {
        None => true,
        Some(last) => now.signed_duration_since(last) >= to_chrono(window),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
