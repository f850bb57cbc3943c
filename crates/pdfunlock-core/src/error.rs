use thiserror::Error;

/// Reasons a PDF capability refuses to open a document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("Incorrect password")]
    IncorrectPassword,

    #[error("PDF is not password protected")]
    NotEncrypted,

    #[error("Unsupported encryption: {0}")]
    UnsupportedEncryption(String),

    #[error("Failed to parse PDF: {0}")]
    Corrupt(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SaveError {
    #[error("Failed to save PDF: {0}")]
    Write(String),
}

/// Terminal failure of a single decryption request
///
/// Every variant is reported to the caller as HTTP 400 with the `Display`
/// text as the error message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("Request body is empty")]
    EmptyBody,

    #[error("{0}")]
    Malformed(String),

    #[error("Missing \"{0}\"")]
    MissingField(&'static str),

    #[error("Invalid \"fileBase64\": {0}")]
    InvalidEncoding(String),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Save(#[from] SaveError),

    #[error("Processing timed out after {0}ms")]
    Timeout(u64),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl RequestError {
    /// Malformed or missing client input, rejected before any decryption attempt
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            RequestError::EmptyBody
                | RequestError::Malformed(_)
                | RequestError::MissingField(_)
                | RequestError::InvalidEncoding(_)
        )
    }
}
