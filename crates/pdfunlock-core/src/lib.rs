//! PDF password removal
//!
//! This crate holds everything the decryption endpoint and its clients share:
//! - `wire`: JSON bodies exchanged over HTTP
//! - `codec`: base64 transport encoding for PDF bytes
//! - `capability`: the load/save seam over a PDF library (`LopdfCapability`)
//! - `endpoint`: the stateless request handler
//! - `security`: standard security handler helpers (owner password support)

pub mod capability;
pub mod codec;
pub mod endpoint;
pub mod error;
pub mod security;
pub mod wire;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;

pub use capability::{LopdfCapability, PdfCapability};
pub use endpoint::{handle, parse_request, process, EndpointConfig, EndpointResponse};
pub use error::{LoadError, RequestError, SaveError};
pub use wire::{DecryptionRequest, DecryptionResult, ErrorBody, UnlockedBody};

/// Returns true when the bytes start with a PDF header
pub fn looks_like_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(b"%PDF-")
}
