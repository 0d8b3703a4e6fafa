pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /predict                      classify a reading, alert on faults (POST)
/// /maintenance/status           run the maintenance check (GET)
/// /maintenance/performed        record that maintenance was done (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/predict", post(handlers::predict::predict))
        .route(
            "/maintenance/status",
            get(handlers::maintenance::maintenance_status),
        )
        .route(
            "/maintenance/performed",
            post(handlers::maintenance::maintenance_performed),
        )
}
