use std::path::PathBuf;

use thiserror::Error;

/// Failure of a whole batch, before any file is processed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    #[error("Please select at least one PDF.")]
    NoFiles,
}

/// The endpoint could not be reached or did not answer
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("{0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Request(err.to_string())
    }
}

/// An unlocked file could not be handed to its destination
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build zip bundle: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Why a single file was not unlocked
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The source file could not be read; no request was sent
    #[error("Could not read file: {0}")]
    Read(String),

    #[error("Network error: {0}")]
    Network(String),

    /// The endpoint answered with an error message
    #[error("{0}")]
    Rejected(String),

    /// Non-success status without a readable error body
    #[error("Server returned {0}")]
    Status(u16),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl FailureReason {
    /// User-facing notice for a failed file
    pub fn notice(&self, file_name: &str) -> String {
        match self {
            FailureReason::Network(message) => {
                format!("Network error for {}: {}", file_name, message)
            }
            other => format!("Failed to unlock {}: {}", file_name, other),
        }
    }
}
