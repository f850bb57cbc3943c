//! The batch loop
//!
//! Files are processed in input order. By default one request is in flight at
//! a time; with a higher concurrency several run together but the reports
//! still come back in input order. A failed file never stops the batch.

use std::sync::{Arc, Mutex};

use futures::stream::{self, StreamExt};
use pdfunlock_core::DecryptionRequest;
use tracing::{debug, info, warn};

use crate::download::{ArtifactNames, DownloadSink};
use crate::error::{BatchError, FailureReason};
use crate::notify::{LogNotifier, Notifier};
use crate::policy::{FileTask, PasswordPolicy};
use crate::source::SourceFile;
use crate::transport::{classify, Transport};

/// Tunables of a batch run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Maximum number of requests in flight (values below 1 count as 1)
    pub concurrency: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self { concurrency: 1 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Unlocked and handed to the download sink
    Unlocked { artifact: String, size: usize },
    Failed(FailureReason),
}

/// Result for one input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub name: String,
    pub outcome: FileOutcome,
}

impl FileReport {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, FileOutcome::Unlocked { .. })
    }
}

/// Per-file reports, one per input file, in input order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub reports: Vec<FileReport>,
}

impl BatchOutcome {
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.reports.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.len() - self.succeeded()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }
}

pub struct BatchDriver {
    transport: Arc<dyn Transport>,
    sink: Arc<dyn DownloadSink>,
    notifier: Arc<dyn Notifier>,
    options: BatchOptions,
}

impl BatchDriver {
    pub fn new(transport: Arc<dyn Transport>, sink: Arc<dyn DownloadSink>) -> Self {
        Self {
            transport,
            sink,
            notifier: Arc::new(LogNotifier),
            options: BatchOptions::default(),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_options(mut self, options: BatchOptions) -> Self {
        self.options = options;
        self
    }

    /// Unlock every selected file
    ///
    /// Passwords are resolved for all files before the first request is sent.
    pub async fn run(
        &self,
        files: Vec<SourceFile>,
        policy: &PasswordPolicy,
    ) -> Result<BatchOutcome, BatchError> {
        if files.is_empty() {
            let err = BatchError::NoFiles;
            self.notifier.notify(&err.to_string());
            return Err(err);
        }

        let tasks = policy.resolve(files).await;
        let concurrency = self.options.concurrency.max(1);
        info!(files = tasks.len(), concurrency, "starting batch");

        // Results leave `buffered` in input order, so delivery order matches too
        let names = Mutex::new(ArtifactNames::new());
        let reports: Vec<FileReport> = stream::iter(tasks.iter().map(|task| self.unlock(task)))
            .buffered(concurrency)
            .then(|(name, result)| self.finish(name, result, &names))
            .collect()
            .await;

        let outcome = BatchOutcome { reports };
        info!(
            succeeded = outcome.succeeded(),
            failed = outcome.failed(),
            "batch finished"
        );
        Ok(outcome)
    }

    async fn finish(
        &self,
        name: String,
        result: Result<Vec<u8>, FailureReason>,
        names: &Mutex<ArtifactNames>,
    ) -> FileReport {
        let outcome = match result {
            Ok(bytes) => {
                let artifact = names
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .unlocked(&name, bytes);
                let artifact_name = artifact.name.clone();
                let size = artifact.bytes.len();
                if let Err(err) = self.sink.deliver(artifact).await {
                    warn!(file = %name, error = %err, "could not deliver unlocked file");
                }
                FileOutcome::Unlocked {
                    artifact: artifact_name,
                    size,
                }
            }
            Err(reason) => {
                warn!(file = %name, reason = %reason, "file not unlocked");
                self.notifier.notify(&reason.notice(&name));
                FileOutcome::Failed(reason)
            }
        };
        FileReport { name, outcome }
    }

    async fn unlock(&self, task: &FileTask) -> (String, Result<Vec<u8>, FailureReason>) {
        let name = task.source.name().to_string();
        (name, self.request(task).await)
    }

    async fn request(&self, task: &FileTask) -> Result<Vec<u8>, FailureReason> {
        let bytes = task
            .source
            .read()
            .await
            .map_err(|e| FailureReason::Read(e.to_string()))?;
        if !pdfunlock_core::looks_like_pdf(&bytes) {
            debug!(file = task.source.name(), "no PDF header, sending anyway");
        }
        debug!(file = task.source.name(), bytes = bytes.len(), "sending file");

        let request = DecryptionRequest::from_pdf(&bytes, task.password.as_str());
        let response = self
            .transport
            .send(&request)
            .await
            .map_err(|e| FailureReason::Network(e.to_string()))?;
        classify(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::Artifact;
    use crate::error::TransportError;
    use crate::notify::CollectingNotifier;
    use crate::transport::TransportResponse;
    use async_trait::async_trait;

    /// Answers 200 with the request password echoed back as the "PDF"
    struct Echo {
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl Transport for Echo {
        async fn send(&self, request: &DecryptionRequest) -> Result<TransportResponse, TransportError> {
            *self.calls.lock().unwrap() += 1;
            let body = serde_json::json!({
                "unlockedBase64": pdfunlock_core::codec::encode(request.password.as_bytes())
            });
            Ok(TransportResponse {
                status: 200,
                body: serde_json::to_vec(&body).unwrap(),
            })
        }
    }

    struct Discard;

    #[async_trait]
    impl DownloadSink for Discard {
        async fn deliver(&self, _artifact: Artifact) -> Result<(), crate::error::DeliveryError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_empty_selection_sends_nothing() {
        let echo = Arc::new(Echo {
            calls: Mutex::new(0),
        });
        let notifier = Arc::new(CollectingNotifier::new());
        let driver = BatchDriver::new(echo.clone(), Arc::new(Discard)).with_notifier(notifier.clone());

        let err = driver
            .run(Vec::new(), &PasswordPolicy::Uniform("pw".into()))
            .await
            .unwrap_err();

        assert_eq!(err, BatchError::NoFiles);
        assert_eq!(*echo.calls.lock().unwrap(), 0);
        assert_eq!(notifier.messages(), vec!["Please select at least one PDF."]);
    }

    #[tokio::test]
    async fn test_one_request_per_file() {
        let echo = Arc::new(Echo {
            calls: Mutex::new(0),
        });
        let driver = BatchDriver::new(echo.clone(), Arc::new(Discard));
        let files = vec![
            SourceFile::in_memory("a.pdf", b"a".to_vec()),
            SourceFile::in_memory("b.pdf", b"b".to_vec()),
        ];

        let outcome = driver
            .run(files, &PasswordPolicy::Uniform("pw".into()))
            .await
            .unwrap();

        assert_eq!(*echo.calls.lock().unwrap(), 2);
        assert_eq!(outcome.succeeded(), 2);
        assert_eq!(
            outcome.reports[1].outcome,
            FileOutcome::Unlocked {
                artifact: "unlocked_b.pdf".into(),
                size: 2
            }
        );
    }

    #[tokio::test]
    async fn test_unreadable_file_sends_no_request() {
        let echo = Arc::new(Echo {
            calls: Mutex::new(0),
        });
        let driver = BatchDriver::new(echo.clone(), Arc::new(Discard));
        let files = vec![
            SourceFile::from_path("/definitely/not/here.pdf"),
            SourceFile::in_memory("b.pdf", b"b".to_vec()),
        ];

        let outcome = driver
            .run(files, &PasswordPolicy::Uniform("pw".into()))
            .await
            .unwrap();

        assert_eq!(*echo.calls.lock().unwrap(), 1);
        assert!(matches!(
            outcome.reports[0].outcome,
            FileOutcome::Failed(FailureReason::Read(_))
        ));
        assert!(outcome.reports[1].is_success());
    }

    #[test]
    fn test_outcome_counts() {
        let outcome = BatchOutcome {
            reports: vec![
                FileReport {
                    name: "a.pdf".into(),
                    outcome: FileOutcome::Unlocked {
                        artifact: "unlocked_a.pdf".into(),
                        size: 10,
                    },
                },
                FileReport {
                    name: "b.pdf".into(),
                    outcome: FileOutcome::Failed(FailureReason::Status(500)),
                },
            ],
        };
        assert_eq!(outcome.len(), 2);
        assert_eq!(outcome.succeeded(), 1);
        assert_eq!(outcome.failed(), 1);
        assert!(!outcome.all_succeeded());
    }
}
