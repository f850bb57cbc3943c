//! Error types for the PDF unlock server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pdfunlock_core::{ErrorBody, RequestError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("Request body rejected: {0}")]
    Body(String),

    #[error("Request body exceeds {0} bytes")]
    PayloadTooLarge(usize),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::Request(_) | ServerError::Body(_) => StatusCode::BAD_REQUEST,
            ServerError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        };

        let body = ErrorBody {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
