//! Shared helpers for batch tests

#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use pdfunlock_batch::{Artifact, DeliveryError, DownloadSink, PasswordPrompt};

/// Keeps every delivered artifact
#[derive(Default)]
pub struct RecordingSink {
    artifacts: Mutex<Vec<Artifact>>,
}

impl RecordingSink {
    pub fn names(&self) -> Vec<String> {
        self.artifacts
            .lock()
            .unwrap()
            .iter()
            .map(|artifact| artifact.name.clone())
            .collect()
    }

    pub fn artifacts(&self) -> Vec<Artifact> {
        self.artifacts.lock().unwrap().clone()
    }
}

#[async_trait]
impl DownloadSink for RecordingSink {
    async fn deliver(&self, artifact: Artifact) -> Result<(), DeliveryError> {
        self.artifacts.lock().unwrap().push(artifact);
        Ok(())
    }
}

/// Always fails to deliver
pub struct BrokenSink;

#[async_trait]
impl DownloadSink for BrokenSink {
    async fn deliver(&self, _artifact: Artifact) -> Result<(), DeliveryError> {
        Err(DeliveryError::Write {
            path: "unwritable".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        })
    }
}

/// Answers prompts from a fixed list and records the questions
pub struct ScriptedPrompt {
    answers: Mutex<Vec<Option<String>>>,
    pub asked: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn new(answers: &[Option<&str>]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().map(|a| a.map(str::to_string)).collect()),
            asked: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl PasswordPrompt for ScriptedPrompt {
    async fn ask(&self, file_name: &str) -> Option<String> {
        self.asked.lock().unwrap().push(file_name.to_string());
        let mut answers = self.answers.lock().unwrap();
        if answers.is_empty() {
            None
        } else {
            answers.remove(0)
        }
    }
}
