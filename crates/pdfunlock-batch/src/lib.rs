//! Batch driver for PDF password removal
//!
//! Takes a selection of files and a [`PasswordPolicy`], sends one decryption
//! request per file and hands every unlocked file to a [`DownloadSink`].
//! Failures are reported per file through a [`Notifier`] and never abort the
//! rest of the batch.
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use pdfunlock_batch::{BatchDriver, DirectorySink, HttpTransport, PasswordPolicy, SourceFile};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = HttpTransport::new("http://localhost:8080/api/remove-password", Duration::from_secs(120))?;
//! let driver = BatchDriver::new(Arc::new(transport), Arc::new(DirectorySink::new(".")));
//! let outcome = driver
//!     .run(vec![SourceFile::from_path("statement.pdf")], &PasswordPolicy::Uniform("abc123".into()))
//!     .await?;
//! println!("{} of {} unlocked", outcome.succeeded(), outcome.len());
//! # Ok(())
//! # }
//! ```

pub mod download;
pub mod driver;
pub mod error;
pub mod notify;
pub mod policy;
pub mod source;
pub mod transport;

pub use download::{Artifact, ArtifactNames, DirectorySink, DownloadSink, ZipSink, BUNDLE_NAME};
pub use driver::{BatchDriver, BatchOptions, BatchOutcome, FileOutcome, FileReport};
pub use error::{BatchError, DeliveryError, FailureReason, TransportError};
pub use notify::{CollectingNotifier, LogNotifier, Notifier};
pub use policy::{FileTask, PasswordPolicy, PasswordPrompt};
pub use source::SourceFile;
pub use transport::{
    classify, HttpTransport, InProcessTransport, Transport, TransportResponse, DEFAULT_TIMEOUT_SECS,
};
