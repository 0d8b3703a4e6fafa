use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use millguard_engine::MonitorError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`MonitorError`] and implements [`IntoResponse`] to produce
/// consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A monitoring operation failed.
    #[error(transparent)]
    Monitor(#[from] MonitorError),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Monitor(err) => match err {
                MonitorError::InvalidInput(msg) => {
                    (StatusCode::BAD_REQUEST, "INVALID_INPUT", msg.clone())
                }
                MonitorError::ClassificationUnavailable(msg) => {
                    tracing::error!(error = %msg, "Classification failed");
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "CLASSIFICATION_UNAVAILABLE",
                        "The classifier is unavailable".to_string(),
                    )
                }
                MonitorError::StateStoreUnavailable(e) => {
                    tracing::error!(error = %e, "State store unavailable");
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "STATE_STORE_UNAVAILABLE",
                        "The state store is unavailable".to_string(),
                    )
                }
                MonitorError::Config(msg) => internal(msg),
            },
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal(msg: &str) -> (StatusCode, &'static str, String) {
    tracing::error!(error = %msg, "Internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
