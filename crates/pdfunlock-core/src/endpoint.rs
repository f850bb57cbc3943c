//! Stateless decryption endpoint
//!
//! [`handle`] takes a raw request body and a [`PdfCapability`] and always
//! produces exactly one [`EndpointResponse`]: 200 with the unlocked file, or
//! 400 with an error message. Panics raised while processing are caught here
//! and reported like any other failure.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use tracing::{debug, error, info};

use crate::capability::{LopdfCapability, PdfCapability};
use crate::codec;
use crate::error::RequestError;
use crate::wire::{DecryptionRequest, DecryptionResult, ErrorBody, RawRequest, UnlockedBody};

/// Default request body limit (64 MiB of base64 text)
pub const DEFAULT_BODY_LIMIT: usize = 64 * 1024 * 1024;

/// Default processing timeout
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Settings of an endpoint deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    /// Largest accepted request body in bytes
    pub body_limit: usize,
    /// Wall-clock budget for a single request
    pub timeout: Duration,
    /// Reject documents that carry no password
    pub reject_unencrypted: bool,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            body_limit: DEFAULT_BODY_LIMIT,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            reject_unencrypted: false,
        }
    }
}

impl EndpointConfig {
    pub fn capability(&self) -> LopdfCapability {
        LopdfCapability::new().reject_unencrypted(self.reject_unencrypted)
    }
}

/// Status and body of one endpoint invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointResponse {
    pub status: u16,
    pub result: DecryptionResult,
}

impl EndpointResponse {
    pub fn is_success(&self) -> bool {
        matches!(self.result, DecryptionResult::Success(_))
    }
}

impl From<Result<UnlockedBody, RequestError>> for EndpointResponse {
    fn from(result: Result<UnlockedBody, RequestError>) -> Self {
        let result = match result {
            Ok(body) => DecryptionResult::Success(body),
            Err(err) => DecryptionResult::Failure(ErrorBody {
                error: err.to_string(),
            }),
        };
        Self {
            status: result.status(),
            result,
        }
    }
}

/// Run one request through the endpoint
pub fn handle<C: PdfCapability>(body: &[u8], capability: &C) -> EndpointResponse {
    process(body, capability).into()
}

/// Like [`handle`], keeping the typed error
pub fn process<C: PdfCapability>(body: &[u8], capability: &C) -> Result<UnlockedBody, RequestError> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| unlock(body, capability)))
        .unwrap_or_else(|payload| Err(RequestError::Unexpected(panic_message(payload.as_ref()))));

    match &result {
        Ok(body) => info!(output_len = body.unlocked_base64.len(), "password removed"),
        Err(err) if err.is_input_error() => debug!(error = %err, "rejected request"),
        Err(err @ RequestError::Unexpected(_)) => error!(error = %err, "request failed unexpectedly"),
        Err(err) => info!(error = %err, "could not unlock document"),
    }
    result
}

/// Validate a raw body into a request
///
/// Missing and empty fields are treated the same; `fileBase64` is checked first.
pub fn parse_request(body: &[u8]) -> Result<DecryptionRequest, RequestError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(RequestError::EmptyBody);
    }

    let raw: RawRequest =
        serde_json::from_slice(body).map_err(|e| RequestError::Malformed(e.to_string()))?;

    let file_base64 = raw
        .file_base64
        .filter(|value| !value.is_empty())
        .ok_or(RequestError::MissingField("fileBase64"))?;
    let password = raw
        .password
        .filter(|value| !value.is_empty())
        .ok_or(RequestError::MissingField("password"))?;

    Ok(DecryptionRequest {
        file_base64,
        password,
    })
}

fn unlock<C: PdfCapability>(body: &[u8], capability: &C) -> Result<UnlockedBody, RequestError> {
    let request = parse_request(body)?;
    let bytes = codec::decode(&request.file_base64)
        .map_err(|e| RequestError::InvalidEncoding(e.to_string()))?;
    debug!(input_len = bytes.len(), "decoded upload");

    let document = capability.load(&bytes, &request.password)?;
    let unlocked = capability.save(document)?;

    Ok(UnlockedBody {
        unlocked_base64: codec::encode(&unlocked),
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic while processing request".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{LoadError, SaveError};
    use crate::fixtures;
    use lopdf::Document;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    fn body(value: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    fn request_for(pdf: &[u8], password: &str) -> Vec<u8> {
        serde_json::to_vec(&DecryptionRequest::from_pdf(pdf, password)).unwrap()
    }

    fn error_of(response: &EndpointResponse) -> &str {
        match &response.result {
            DecryptionResult::Failure(body) => &body.error,
            DecryptionResult::Success(_) => panic!("expected a failure, got {:?}", response),
        }
    }

    fn unlocked_of(response: &EndpointResponse) -> Vec<u8> {
        match &response.result {
            DecryptionResult::Success(body) => codec::decode(&body.unlocked_base64).unwrap(),
            DecryptionResult::Failure(body) => panic!("expected success, got {}", body.error),
        }
    }

    struct PanickingCapability;

    impl PdfCapability for PanickingCapability {
        type Document = ();

        fn load(&self, _bytes: &[u8], _password: &str) -> Result<(), LoadError> {
            panic!("parser exploded")
        }

        fn save(&self, _document: ()) -> Result<Vec<u8>, SaveError> {
            Ok(Vec::new())
        }
    }

    struct FailingSave;

    impl PdfCapability for FailingSave {
        type Document = ();

        fn load(&self, _bytes: &[u8], _password: &str) -> Result<(), LoadError> {
            Ok(())
        }

        fn save(&self, _document: ()) -> Result<Vec<u8>, SaveError> {
            Err(SaveError::Write("disk full".into()))
        }
    }

    #[test]
    fn test_correct_password_returns_openable_pdf() {
        let locked = fixtures::encrypted_pdf("abc123", "owner", "Statement");
        let response = handle(&request_for(&locked, "abc123"), &LopdfCapability::new());

        assert_eq!(response.status, 200);
        let doc = Document::load_mem(&unlocked_of(&response)).unwrap();
        assert!(!doc.is_encrypted());
        assert_eq!(fixtures::info_title(&doc).as_deref(), Some("Statement"));
        assert_eq!(
            fixtures::annotation_note(&doc).as_deref(),
            Some("Note on Statement")
        );
    }

    #[test]
    fn test_owner_password_is_accepted() {
        let locked = fixtures::encrypted_pdf("abc123", "owner", "Statement");
        let response = handle(&request_for(&locked, "owner"), &LopdfCapability::new());
        assert_eq!(response.status, 200);
    }

    #[test]
    fn test_wrong_password_is_400() {
        let locked = fixtures::encrypted_pdf("abc123", "owner", "Statement");
        let response = handle(&request_for(&locked, "letmein"), &LopdfCapability::new());

        assert_eq!(response.status, 400);
        assert_eq!(error_of(&response), "Incorrect password");
    }

    #[test]
    fn test_same_request_twice_gives_same_result() {
        let locked = fixtures::encrypted_pdf("abc123", "", "Statement");
        let request = request_for(&locked, "abc123");
        let capability = LopdfCapability::new();

        for _ in 0..2 {
            let response = handle(&request, &capability);
            let doc = Document::load_mem(&unlocked_of(&response)).unwrap();
            assert!(!doc.is_encrypted());
        }
    }

    #[test]
    fn test_empty_body() {
        let response = handle(b"", &LopdfCapability::new());
        assert_eq!(response.status, 400);
        assert_eq!(error_of(&response), "Request body is empty");
    }

    #[test]
    fn test_malformed_json_reports_parser_message() {
        let response = handle(b"{\"fileBase64\": ", &LopdfCapability::new());
        assert_eq!(response.status, 400);
        assert!(error_of(&response).contains("EOF"));
    }

    #[test]
    fn test_missing_fields_are_named() {
        let capability = LopdfCapability::new();

        let response = handle(&body(json!({ "fileBase64": "JVBERg==" })), &capability);
        assert_eq!(error_of(&response), "Missing \"password\"");

        let response = handle(&body(json!({ "password": "abc123" })), &capability);
        assert_eq!(error_of(&response), "Missing \"fileBase64\"");

        let response = handle(&body(json!({})), &capability);
        assert_eq!(error_of(&response), "Missing \"fileBase64\"");
    }

    #[test]
    fn test_empty_password_counts_as_missing() {
        let response = handle(
            &body(json!({ "fileBase64": "JVBERg==", "password": "" })),
            &LopdfCapability::new(),
        );
        assert_eq!(response.status, 400);
        assert_eq!(error_of(&response), "Missing \"password\"");
    }

    #[test]
    fn test_invalid_base64_never_reaches_capability() {
        let response = handle(
            &body(json!({ "fileBase64": "%%% not base64 %%%", "password": "pw" })),
            &PanickingCapability,
        );
        assert_eq!(response.status, 400);
        assert!(error_of(&response).starts_with("Invalid \"fileBase64\""));
    }

    #[test]
    fn test_non_pdf_payload_is_rejected() {
        let response = handle(
            &request_for(b"just some text", "pw"),
            &LopdfCapability::new(),
        );
        assert_eq!(response.status, 400);
        assert!(error_of(&response).starts_with("Failed to parse PDF"));
    }

    #[test]
    fn test_panic_becomes_400() {
        let response = handle(&request_for(b"%PDF-1.4", "pw"), &PanickingCapability);
        assert_eq!(response.status, 400);
        assert_eq!(error_of(&response), "Unexpected error: parser exploded");
    }

    #[test]
    fn test_save_failure_is_reported() {
        let err = process(&request_for(b"%PDF-1.4", "pw"), &FailingSave).unwrap_err();
        assert_eq!(err, RequestError::Save(SaveError::Write("disk full".into())));
        assert_eq!(err.to_string(), "Failed to save PDF: disk full");
    }

    #[test]
    fn test_strict_config_rejects_plain_pdf() {
        let config = EndpointConfig {
            reject_unencrypted: true,
            ..EndpointConfig::default()
        };
        let response = handle(&request_for(&fixtures::plain_pdf("Open"), "pw"), &config.capability());
        assert_eq!(error_of(&response), "PDF is not password protected");
    }

    #[test]
    fn test_default_config() {
        let config = EndpointConfig::default();
        assert_eq!(config.body_limit, 64 * 1024 * 1024);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(!config.reject_unencrypted);
    }

    proptest! {
        #[test]
        fn arbitrary_bodies_never_succeed_or_panic(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
            let response = handle(&bytes, &LopdfCapability::new());
            prop_assert_eq!(response.status, 400);
        }

        #[test]
        fn missing_file_is_reported_for_any_password(password in ".{1,32}") {
            let err = parse_request(&body(json!({ "password": password }))).unwrap_err();
            prop_assert_eq!(err, RequestError::MissingField("fileBase64"));
        }

        #[test]
        fn present_fields_parse_verbatim(file in "[A-Za-z0-9+/]{1,64}", password in ".{1,32}") {
            let request = parse_request(&body(json!({ "fileBase64": file, "password": password }))).unwrap();
            prop_assert_eq!(request.file_base64, file);
            prop_assert_eq!(request.password, password);
        }
    }
}
