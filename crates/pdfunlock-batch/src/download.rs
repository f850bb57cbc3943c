//! Destinations for unlocked files

use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::DeliveryError;

/// File name of the bundle produced by [`ZipSink`]
pub const BUNDLE_NAME: &str = "unlocked_pdfs.zip";

/// An unlocked file ready for download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Artifact {
    /// Artifact for the unlocked version of `source_name`
    pub fn unlocked(source_name: &str, bytes: Vec<u8>) -> Self {
        Self {
            name: format!("unlocked_{}", source_name),
            bytes,
        }
    }
}

/// Artifact names handed out during one batch
///
/// A name that is already taken gets a counter before its extension, the way
/// browsers rename repeated downloads: `unlocked_a.pdf`, `unlocked_a (1).pdf`.
#[derive(Debug, Default)]
pub struct ArtifactNames {
    taken: HashSet<String>,
}

impl ArtifactNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Like [`Artifact::unlocked`], with a name no earlier artifact used
    pub fn unlocked(&mut self, source_name: &str, bytes: Vec<u8>) -> Artifact {
        let mut artifact = Artifact::unlocked(source_name, bytes);
        artifact.name = self.claim(artifact.name);
        artifact
    }

    fn claim(&mut self, name: String) -> String {
        if self.taken.insert(name.clone()) {
            return name;
        }
        let (stem, extension) = match name.rsplit_once('.') {
            Some((stem, extension)) if !stem.is_empty() => (stem, format!(".{}", extension)),
            _ => (name.as_str(), String::new()),
        };
        let mut counter = 1;
        loop {
            let candidate = format!("{} ({}){}", stem, counter, extension);
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            counter += 1;
        }
    }
}

#[async_trait]
pub trait DownloadSink: Send + Sync {
    async fn deliver(&self, artifact: Artifact) -> Result<(), DeliveryError>;
}

/// Writes each artifact as its own file in a directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl DownloadSink for DirectorySink {
    async fn deliver(&self, artifact: Artifact) -> Result<(), DeliveryError> {
        let path = self.dir.join(&artifact.name);
        tokio::fs::write(&path, &artifact.bytes)
            .await
            .map_err(|source| DeliveryError::Write {
                path: path.clone(),
                source,
            })?;
        debug!(path = %path.display(), bytes = artifact.bytes.len(), "saved unlocked file");
        Ok(())
    }
}

/// Collects artifacts in memory and writes them as one zip archive
#[derive(Debug, Default)]
pub struct ZipSink {
    artifacts: Mutex<Vec<Artifact>>,
}

impl ZipSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deflate every collected artifact into an archive, in delivery order
    pub fn to_zip(&self) -> Result<Vec<u8>, DeliveryError> {
        let artifacts = self.lock();
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        for artifact in artifacts.iter() {
            zip.start_file(artifact.name.as_str(), options)?;
            zip.write_all(&artifact.bytes)
                .map_err(zip::result::ZipError::Io)?;
        }
        Ok(zip.finish()?.into_inner())
    }

    /// Write the archive as [`BUNDLE_NAME`] inside `dir`
    pub async fn write_bundle(&self, dir: &Path) -> Result<PathBuf, DeliveryError> {
        let bytes = self.to_zip()?;
        let path = dir.join(BUNDLE_NAME);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| DeliveryError::Write {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Artifact>> {
        self.artifacts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl DownloadSink for ZipSink {
    async fn deliver(&self, artifact: Artifact) -> Result<(), DeliveryError> {
        self.lock().push(artifact);
        Ok(())
    }
}
