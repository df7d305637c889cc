//! Route handlers.

use std::sync::atomic::Ordering;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::request::request_id;
use crate::http::response::{ApiError, ReceivedEnvelope};
use crate::http::server::AppState;
use crate::observability::metrics;

/// Liveness document served on `/health`.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub received_total: u64,
}

/// `POST /send-data`: log the payload and echo it back.
pub async fn send_data(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ReceivedEnvelope>, ApiError> {
    let start = Instant::now();
    let request_id = request_id(&headers);

    let Json(data) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            let err = ApiError::from(rejection);
            tracing::warn!(
                request_id = %request_id,
                status = err.status.as_u16(),
                error = %err.message,
                "Rejected payload"
            );
            metrics::record_request("/send-data", err.status.as_u16(), start);
            return Err(err);
        }
    };

    tracing::info!(request_id = %request_id, received = %data, "Received data");
    state.received_total.fetch_add(1, Ordering::Relaxed);
    metrics::record_request("/send-data", 200, start);

    Ok(Json(ReceivedEnvelope::new(data)))
}

/// `GET /health`.
pub async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        received_total: state.received_total.load(Ordering::Relaxed),
    })
}
