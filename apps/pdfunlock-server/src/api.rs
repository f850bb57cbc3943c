//! API handlers for the PDF unlock server

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::StatusCode,
    Json,
};
use pdfunlock_core::{EndpointConfig, RequestError, UnlockedBody};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ServerError;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "pdfunlock-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Handler: POST /api/remove-password
///
/// The body is read as raw bytes whatever its content type, then handed to
/// the endpoint on the blocking pool.
pub async fn handle_remove_password(
    State(config): State<Arc<EndpointConfig>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<UnlockedBody>, ServerError> {
    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            warn!(limit = config.body_limit, "request body too large");
            ServerError::PayloadTooLarge(config.body_limit)
        } else {
            ServerError::Body(rejection.body_text())
        }
    })?;
    debug!(body_len = body.len(), "remove-password request");

    let capability = config.capability();
    let timeout = config.timeout;
    // A timed-out task is not cancelled; it finishes on the blocking pool
    let result = tokio::time::timeout(
        timeout,
        tokio::task::spawn_blocking(move || pdfunlock_core::process(&body, &capability)),
    )
    .await;

    let unlocked = match result {
        Ok(Ok(outcome)) => outcome?,
        Ok(Err(join_error)) => {
            return Err(RequestError::Unexpected(join_error.to_string()).into());
        }
        Err(_elapsed) => {
            let ms = timeout.as_millis() as u64;
            warn!(timeout_ms = ms, "processing timed out");
            return Err(RequestError::Timeout(ms).into());
        }
    };

    Ok(Json(unlocked))
}
