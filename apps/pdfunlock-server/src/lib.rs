//! PDF unlock server
//!
//! Serves the decryption endpoint over HTTP:
//!
//! - `POST /api/remove-password` with `{ "fileBase64", "password" }`
//! - `GET /health`
//!
//! Every failure of the endpoint is answered with a JSON `{ "error" }` body.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use pdfunlock_core::EndpointConfig;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

mod api;
mod error;

pub use api::{handle_health, handle_remove_password, HealthResponse};
pub use error::ServerError;

/// Path of the decryption endpoint
pub const REMOVE_PASSWORD_PATH: &str = "/api/remove-password";

/// Build the router with its middleware
pub fn router(config: EndpointConfig) -> Router {
    let body_limit = config.body_limit;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route(REMOVE_PASSWORD_PATH, post(handle_remove_password))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(Arc::new(config))
}
