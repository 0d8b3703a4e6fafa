use millguard_db::StoreError;

/// Failure of a monitoring operation.
///
/// Channel delivery failures never appear here; they are isolated in the
/// dispatch report.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// Missing or malformed sensor values. Nothing was mutated.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The scaler or model failed, or returned an unusable result.
    #[error("Classification unavailable: {0}")]
    ClassificationUnavailable(String),

    /// The state store could not answer a question the operation depends on.
    #[error(transparent)]
    StateStoreUnavailable(#[from] StoreError),

    /// Invalid monitor configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}
