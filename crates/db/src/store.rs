//! The state store port.
//!
//! All bookkeeping lives in the store; the monitor never caches it between
//! invocations. Check-then-act races are closed by [`StateStore::compare_and_set`]:
//! a writer only wins if the value it read is still the stored value.
//!
//! Timestamps cross the store boundary as UTC strings with second
//! resolution (`YYYY-MM-DD HH:MM:SS`). Compare-and-set compares the encoded
//! form, so an expected value with sub-second precision still matches.

use std::fmt;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use millguard_core::types::Timestamp;

/// Wire format for persisted timestamps (always UTC).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const FAULT_ALERT_PREFIX: &str = "alert:";
const MAINTENANCE_LAST_PERFORMED: &str = "maintenance:last_performed";
const MAINTENANCE_LAST_ALERT: &str = "maintenance:last_alert";

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Errors returned by a [`StateStore`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend could not be reached or refused the operation.
    #[error("State store unavailable: {0}")]
    Unavailable(String),

    /// A stored value is not a timestamp in [`TIMESTAMP_FORMAT`].
    #[error("Malformed timestamp for key {key}: '{value}'")]
    Codec { key: String, value: String },

    /// PostgreSQL backend error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

// ---------------------------------------------------------------------------
// StateKey
// ---------------------------------------------------------------------------

/// Every key the monitor reads or writes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StateKey {
    /// Last alert sent for one fault class (`alert:<name>`).
    FaultAlert(String),
    /// Last time maintenance was performed.
    MaintenanceLastPerformed,
    /// Last time a maintenance-due alert was sent.
    MaintenanceLastAlert,
}

impl StateKey {
    pub fn fault_alert(class_name: impl Into<String>) -> Self {
        Self::FaultAlert(class_name.into())
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FaultAlert(name) => write!(f, "{FAULT_ALERT_PREFIX}{name}"),
            Self::MaintenanceLastPerformed => f.write_str(MAINTENANCE_LAST_PERFORMED),
            Self::MaintenanceLastAlert => f.write_str(MAINTENANCE_LAST_ALERT),
        }
    }
}

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

/// Format a timestamp for storage.
pub fn encode_timestamp(ts: Timestamp) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored timestamp. `key` is only used for the error message.
pub fn decode_timestamp(key: &StateKey, value: &str) -> Result<Timestamp, StoreError> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| StoreError::Codec {
            key: key.to_string(),
            value: value.to_string(),
        })
}

// ---------------------------------------------------------------------------
// StateStore
// ---------------------------------------------------------------------------

/// Durable key-to-timestamp mapping shared by every monitor instance.
///
/// Implementations must be `Send + Sync + 'static` so one store can be
/// shared via `Arc<dyn StateStore>` across tasks.
#[async_trait]
pub trait StateStore: Send + Sync + 'static {
    /// Read the timestamp stored under `key`, or `None` if absent.
    async fn get(&self, key: &StateKey) -> Result<Option<Timestamp>, StoreError>;

    /// Atomically replace the value under `key` with `new` if and only if
    /// the current value equals `expected` (`None` meaning absent).
    ///
    /// Returns `Ok(false)` when another writer got there first.
    async fn compare_and_set(
        &self,
        key: &StateKey,
        expected: Option<Timestamp>,
        new: Timestamp,
    ) -> Result<bool, StoreError>;

    /// Unconditionally overwrite the value under `key`.
    async fn put(&self, key: &StateKey, value: Timestamp) -> Result<(), StoreError>;

    /// Delete `key` if present.
    async fn remove(&self, key: &StateKey) -> Result<(), StoreError>;

    /// Confirm the backend is reachable.
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
