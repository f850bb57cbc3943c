//! Delivery of decryption requests to an endpoint
//!
//! [`HttpTransport`] talks to a remote server. [`InProcessTransport`] runs the
//! endpoint handler in the current process.

use std::time::Duration;

use async_trait::async_trait;
use pdfunlock_core::wire::CONTENT_TYPE_JSON;
use pdfunlock_core::{codec, DecryptionRequest, ErrorBody, PdfCapability, UnlockedBody};
use reqwest::Client;
use tracing::debug;

use crate::error::{FailureReason, TransportError};

/// Default client-side timeout for a single request
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Raw answer of the endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request; `Err` means no response was received
    async fn send(&self, request: &DecryptionRequest) -> Result<TransportResponse, TransportError>;
}

/// JSON over HTTP POST
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &DecryptionRequest) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE_JSON)
            .json(request)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        debug!(status, body_len = body.len(), "endpoint answered");
        Ok(TransportResponse { status, body })
    }
}

/// Calls the endpoint handler directly, without a network hop
///
/// Each request runs on the blocking pool, so several can be in progress.
#[derive(Debug, Clone)]
pub struct InProcessTransport<C> {
    capability: C,
}

impl<C> InProcessTransport<C> {
    pub fn new(capability: C) -> Self {
        Self { capability }
    }
}

#[async_trait]
impl<C> Transport for InProcessTransport<C>
where
    C: PdfCapability + Clone + Send + Sync + 'static,
{
    async fn send(&self, request: &DecryptionRequest) -> Result<TransportResponse, TransportError> {
        let body = serde_json::to_vec(request).map_err(|e| TransportError::Request(e.to_string()))?;
        let capability = self.capability.clone();
        let response =
            tokio::task::spawn_blocking(move || pdfunlock_core::handle(&body, &capability))
                .await
                .map_err(|e| TransportError::Request(e.to_string()))?;
        let body =
            serde_json::to_vec(&response.result).map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(TransportResponse {
            status: response.status,
            body,
        })
    }
}

/// Turn an endpoint answer into unlocked PDF bytes or a failure reason
pub fn classify(response: &TransportResponse) -> Result<Vec<u8>, FailureReason> {
    if !response.is_success() {
        return match serde_json::from_slice::<ErrorBody>(&response.body) {
            Ok(body) if !body.error.is_empty() => Err(FailureReason::Rejected(body.error)),
            _ => Err(FailureReason::Status(response.status)),
        };
    }

    let body: UnlockedBody = serde_json::from_slice(&response.body)
        .map_err(|e| FailureReason::Malformed(e.to_string()))?;
    codec::decode(&body.unlocked_base64).map_err(|e| FailureReason::Malformed(e.to_string()))
}
