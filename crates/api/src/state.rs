use std::sync::Arc;

use millguard_db::StateStore;
use millguard_engine::{DecisionCore, MaintenanceScheduler};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Classifies readings and sends fault alerts.
    pub decision: Arc<DecisionCore>,
    /// Maintenance due check and service log.
    pub maintenance: Arc<MaintenanceScheduler>,
    /// Backing store, used directly only for health checks.
    pub store: Arc<dyn StateStore>,
    pub config: Arc<ServerConfig>,
}
