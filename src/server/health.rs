//! Liveness endpoint.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use super::AppState;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Health {
    pub status: &'static str,
    /// Items the queue can take before webhook requests start waiting.
    pub queue_free: usize,
}

/// Reports that the server is up, plus free queue slots so a stalled worker
/// shows up as a shrinking number.
pub async fn health_handler(State(app_state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        queue_free: app_state.queue().available(),
    })
}
