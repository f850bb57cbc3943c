//! JSON bodies of the decryption endpoint
//!
//! ```text
//! POST  { "fileBase64": "...", "password": "..." }
//! 200   { "unlockedBase64": "..." }
//! 400   { "error": "..." }
//! ```

use serde::{Deserialize, Serialize};

use crate::codec;

pub const STATUS_OK: u16 = 200;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// A validated request: both fields present and non-empty
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecryptionRequest {
    pub file_base64: String,
    pub password: String,
}

impl DecryptionRequest {
    pub fn new(file_base64: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            file_base64: file_base64.into(),
            password: password.into(),
        }
    }

    /// Build a request from raw PDF bytes
    pub fn from_pdf(pdf: &[u8], password: impl Into<String>) -> Self {
        Self::new(codec::encode(pdf), password)
    }
}

impl std::fmt::Debug for DecryptionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecryptionRequest")
            .field("file_base64_len", &self.file_base64.len())
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Request body as it arrives on the wire; either field may be absent
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawRequest {
    pub file_base64: Option<String>,
    pub password: Option<String>,
}

/// Body of a 200 response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockedBody {
    pub unlocked_base64: String,
}

/// Body of a 400 response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Exactly one of these is produced per request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DecryptionResult {
    Success(UnlockedBody),
    Failure(ErrorBody),
}

impl DecryptionResult {
    pub fn status(&self) -> u16 {
        match self {
            DecryptionResult::Success(_) => STATUS_OK,
            DecryptionResult::Failure(_) => STATUS_BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_request_uses_camel_case_fields() {
        let request = DecryptionRequest::new("JVBERg==", "abc123");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value, json!({ "fileBase64": "JVBERg==", "password": "abc123" }));
    }

    #[test]
    fn test_request_from_pdf_encodes_bytes() {
        let request = DecryptionRequest::from_pdf(b"%PDF", "pw");
        assert_eq!(request.file_base64, "JVBERg==");
    }

    #[test]
    fn test_debug_redacts_password() {
        let request = DecryptionRequest::new("JVBERg==", "hunter2");
        let debug = format!("{:?}", request);
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_raw_request_tolerates_missing_fields() {
        let raw: RawRequest = serde_json::from_str(r#"{"password":"x"}"#).unwrap();
        assert!(raw.file_base64.is_none());
        assert_eq!(raw.password.as_deref(), Some("x"));
    }

    #[test]
    fn test_result_serializes_to_bare_body() {
        let ok = DecryptionResult::Success(UnlockedBody {
            unlocked_base64: "QQ==".into(),
        });
        let err = DecryptionResult::Failure(ErrorBody {
            error: "Incorrect password".into(),
        });
        assert_eq!(serde_json::to_value(&ok).unwrap(), json!({ "unlockedBase64": "QQ==" }));
        assert_eq!(serde_json::to_value(&err).unwrap(), json!({ "error": "Incorrect password" }));
        assert_eq!(ok.status(), 200);
        assert_eq!(err.status(), 400);
    }
}
