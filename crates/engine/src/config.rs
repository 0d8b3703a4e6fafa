//! Monitor tuning loaded from environment variables.

use std::time::Duration;

use millguard_core::classification::DEFAULT_NORMAL_OVERRIDE_THRESHOLD;
use millguard_core::fault::FaultClassMap;
use millguard_core::schedule::{
    DEFAULT_FAULT_COOLDOWN, DEFAULT_MAINTENANCE_ALERT_SUPPRESSION, DEFAULT_MAINTENANCE_INTERVAL,
};
use millguard_events::dispatcher::DEFAULT_CHANNEL_TIMEOUT;

use crate::error::MonitorError;

/// What to do when cooldown or suppression bookkeeping cannot be read or
/// written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreFailurePolicy {
    /// Send the notification anyway. Duplicate alerts are preferred over
    /// silently dropping a real one.
    #[default]
    PreferAlert,
    /// Suppress the notification until the store is reachable again.
    PreferSilence,
}

impl StoreFailurePolicy {
    pub fn parse(value: &str) -> Result<Self, MonitorError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "prefer_alert" => Ok(Self::PreferAlert),
            "prefer_silence" => Ok(Self::PreferSilence),
            other => Err(MonitorError::Config(format!(
                "Unknown STORE_FAILURE_POLICY '{other}', expected prefer_alert or prefer_silence"
            ))),
        }
    }

    /// Whether a notification should still go out after a store failure.
    pub fn notify_on_store_failure(self) -> bool {
        matches!(self, Self::PreferAlert)
    }
}

/// Tuning shared by the decision core and the maintenance scheduler.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Ordered class names the classifier emits probabilities for.
    pub fault_classes: FaultClassMap,
    /// Normal-class probability at or above which the verdict is normal.
    pub normal_override_threshold: f64,
    /// Minimum time between alerts for the same fault class.
    pub fault_cooldown: Duration,
    /// Maintenance is due once this much time has passed since the last service.
    pub maintenance_interval: Duration,
    /// Minimum time between two maintenance-due alerts.
    pub maintenance_alert_suppression: Duration,
    /// Upper bound on one channel's delivery attempt.
    pub channel_timeout: Duration,
    pub store_failure_policy: StoreFailurePolicy,
    /// Clear the maintenance alert timestamp when maintenance is recorded.
    pub reset_suppression_on_maintenance: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            fault_classes: FaultClassMap::default(),
            normal_override_threshold: DEFAULT_NORMAL_OVERRIDE_THRESHOLD,
            fault_cooldown: DEFAULT_FAULT_COOLDOWN,
            maintenance_interval: DEFAULT_MAINTENANCE_INTERVAL,
            maintenance_alert_suppression: DEFAULT_MAINTENANCE_ALERT_SUPPRESSION,
            channel_timeout: DEFAULT_CHANNEL_TIMEOUT,
            store_failure_policy: StoreFailurePolicy::default(),
            reset_suppression_on_maintenance: false,
        }
    }
}

impl MonitorConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                                | Default                            |
    /// |----------------------------------------|------------------------------------|
    /// | `FAULT_CLASSES`                        | `Normal,Bearing Fault,Overheating` |
    /// | `NORMAL_OVERRIDE_THRESHOLD`            | `0.14`                             |
    /// | `FAULT_COOLDOWN_SECS`                  | `600`                              |
    /// | `MAINTENANCE_INTERVAL_SECS`            | `259200` (3 days)                  |
    /// | `MAINTENANCE_ALERT_SUPPRESSION_SECS`   | `10800` (3 hours)                  |
    /// | `CHANNEL_TIMEOUT_SECS`                 | `15`                               |
    /// | `STORE_FAILURE_POLICY`                 | `prefer_alert`                     |
    /// | `MAINTENANCE_RESET_CLEARS_SUPPRESSION` | `false`                            |
    pub fn from_env() -> Result<Self, MonitorError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup (used by `from_env` and tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, MonitorError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(list) = lookup("FAULT_CLASSES") {
            config.fault_classes =
                FaultClassMap::parse(&list).map_err(|e| MonitorError::Config(e.to_string()))?;
        }
        if let Some(raw) = lookup("NORMAL_OVERRIDE_THRESHOLD") {
            config.normal_override_threshold = parse_var("NORMAL_OVERRIDE_THRESHOLD", &raw)?;
        }
        if let Some(raw) = lookup("FAULT_COOLDOWN_SECS") {
            config.fault_cooldown = secs("FAULT_COOLDOWN_SECS", &raw)?;
        }
        if let Some(raw) = lookup("MAINTENANCE_INTERVAL_SECS") {
            config.maintenance_interval = secs("MAINTENANCE_INTERVAL_SECS", &raw)?;
        }
        if let Some(raw) = lookup("MAINTENANCE_ALERT_SUPPRESSION_SECS") {
            config.maintenance_alert_suppression =
                secs("MAINTENANCE_ALERT_SUPPRESSION_SECS", &raw)?;
        }
        if let Some(raw) = lookup("CHANNEL_TIMEOUT_SECS") {
            config.channel_timeout = secs("CHANNEL_TIMEOUT_SECS", &raw)?;
        }
        if let Some(raw) = lookup("STORE_FAILURE_POLICY") {
            config.store_failure_policy = StoreFailurePolicy::parse(&raw)?;
        }
        if let Some(raw) = lookup("MAINTENANCE_RESET_CLEARS_SUPPRESSION") {
            config.reset_suppression_on_maintenance =
                parse_var("MAINTENANCE_RESET_CLEARS_SUPPRESSION", &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the rules meaningless.
    pub fn validate(&self) -> Result<(), MonitorError> {
        if !(0.0..=1.0).contains(&self.normal_override_threshold) {
            return Err(MonitorError::Config(format!(
                "NORMAL_OVERRIDE_THRESHOLD must be within [0, 1], got {}",
                self.normal_override_threshold
            )));
        }
        if self.channel_timeout.is_zero() {
            return Err(MonitorError::Config(
                "CHANNEL_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, MonitorError> {
    raw.trim()
        .parse()
        .map_err(|_| MonitorError::Config(format!("{name} has an invalid value: '{raw}'")))
}

fn secs(name: &str, raw: &str) -> Result<Duration, MonitorError> {
    parse_var::<u64>(name, raw).map(Duration::from_secs)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
