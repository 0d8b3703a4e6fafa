//! Handlers for the maintenance schedule.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use millguard_core::types::Timestamp;
use serde::Serialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MaintenanceStatusResponse {
    pub maintenance_due: bool,
    /// Whether this check dispatched a reminder.
    pub alert_sent: bool,
    pub last_maintenance: Option<Timestamp>,
}

#[derive(Debug, Serialize)]
pub struct MaintenancePerformedResponse {
    pub message: &'static str,
    pub performed_at: Timestamp,
}

/// GET /api/v1/maintenance/status
///
/// Runs the same check as the periodic task, so a due machine may trigger
/// a reminder here too (subject to suppression).
pub async fn maintenance_status(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<MaintenanceStatusResponse>>> {
    let status = state.maintenance.check(Utc::now()).await?;

    Ok(Json(DataResponse {
        data: MaintenanceStatusResponse {
            maintenance_due: status.due,
            alert_sent: status.alert_sent,
            last_maintenance: status.last_maintenance,
        },
    }))
}

/// POST /api/v1/maintenance/performed
pub async fn maintenance_performed(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<MaintenancePerformedResponse>>> {
    let now = Utc::now();
    state.maintenance.record_maintenance_performed(now).await?;

    Ok(Json(DataResponse {
        data: MaintenancePerformedResponse {
            message: "Maintenance recorded",
            performed_at: now,
        },
    }))
}
