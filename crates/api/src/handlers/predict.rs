//! Handler for classifying a sensor reading.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chrono::Utc;
use millguard_core::reading::SensorReading;
use millguard_core::types::Timestamp;
use millguard_engine::MonitorError;
use millguard_events::DispatchReport;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Response body for `POST /api/v1/predict`.
#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    /// Index of the verdict class.
    pub prediction: usize,
    pub label: String,
    pub probs: Vec<f64>,
    /// Whether a fault alert was dispatched for this reading.
    pub notified: bool,
    pub timestamp: Timestamp,
    /// Per-channel delivery outcomes when an alert was dispatched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispatch: Option<DispatchReport>,
}

/// POST /api/v1/predict
///
/// Malformed JSON is reported as `INVALID_INPUT`, the same as a reading
/// with missing values.
pub async fn predict(
    State(state): State<AppState>,
    body: Result<Json<SensorReading>, JsonRejection>,
) -> AppResult<Json<DataResponse<PredictionResponse>>> {
    let Json(reading) =
        body.map_err(|e| AppError::Monitor(MonitorError::InvalidInput(e.body_text())))?;

    let eval = state.decision.evaluate(&reading, Utc::now()).await?;

    tracing::info!(
        prediction = eval.result.class.index,
        label = %eval.result.class.name,
        notified = eval.notified,
        "Prediction served"
    );

    Ok(Json(DataResponse {
        data: PredictionResponse {
            prediction: eval.result.class.index,
            label: eval.result.class.name,
            probs: eval.result.probabilities,
            notified: eval.notified,
            timestamp: eval.result.timestamp,
            dispatch: eval.report,
        },
    }))
}
