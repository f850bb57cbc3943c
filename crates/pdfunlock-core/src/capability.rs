//! PDF capability: open an encrypted document with a password, save it without one
//!
//! The endpoint only talks to the [`PdfCapability`] trait. [`LopdfCapability`]
//! is the shipped implementation.

use lopdf::{Document, Object};
use tracing::debug;

use crate::error::{LoadError, SaveError};
use crate::security::{self, SecurityParams};

/// Open-with-password and save-without-password over some PDF library
pub trait PdfCapability {
    type Document;

    /// Open `bytes`, using `password` to decrypt
    fn load(&self, bytes: &[u8], password: &str) -> Result<Self::Document, LoadError>;

    /// Serialize an opened document as a password-free PDF
    fn save(&self, document: Self::Document) -> Result<Vec<u8>, SaveError>;
}

/// lopdf-backed capability (standard security handler, RC4 revisions 2 and 3)
///
/// The password is tried as the user password first and then as the owner
/// password. Every string and stream is decrypted, including strings nested
/// in dictionaries and arrays (annotations, outlines, form fields).
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfCapability {
    reject_unencrypted: bool,
}

impl LopdfCapability {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail with [`LoadError::NotEncrypted`] for documents without a password
    pub fn reject_unencrypted(mut self, reject: bool) -> Self {
        self.reject_unencrypted = reject;
        self
    }
}

impl PdfCapability for LopdfCapability {
    type Document = Document;

    fn load(&self, bytes: &[u8], password: &str) -> Result<Document, LoadError> {
        let mut doc =
            Document::load_mem(bytes).map_err(|e| LoadError::Corrupt(e.to_string()))?;

        if !doc.is_encrypted() {
            if self.reject_unencrypted {
                return Err(LoadError::NotEncrypted);
            }
            debug!("document carries no password, saving as-is");
            return Ok(doc);
        }

        let params = SecurityParams::from_document(&doc)?;
        let encrypt_id = doc
            .trailer
            .get(b"Encrypt")
            .and_then(Object::as_reference)
            .map_err(|e| LoadError::Corrupt(e.to_string()))?;
        let encrypt_metadata = doc
            .get_dictionary(encrypt_id)
            .and_then(|dict| dict.get(b"EncryptMetadata"))
            .and_then(Object::as_bool)
            .unwrap_or(true);

        let key = match params.user_key(password.as_bytes()) {
            Some(key) => {
                debug!(revision = params.revision, "opened with user password");
                key
            }
            None => {
                let user_password = params.user_password_from_owner(password.as_bytes());
                let key = params
                    .user_key(&user_password)
                    .ok_or(LoadError::IncorrectPassword)?;
                debug!(revision = params.revision, "opened with owner password");
                key
            }
        };

        doc.objects.remove(&encrypt_id);
        doc.trailer.remove(b"Encrypt");
        for (&id, object) in doc.objects.iter_mut() {
            if skips_decryption(object, encrypt_metadata) {
                continue;
            }
            security::decrypt_object(&key, id, object);
        }
        Ok(doc)
    }

    fn save(&self, mut document: Document) -> Result<Vec<u8>, SaveError> {
        let mut buffer = Vec::new();
        document
            .save_to(&mut buffer)
            .map_err(|e| SaveError::Write(e.to_string()))?;
        Ok(buffer)
    }
}

/// Cross-reference streams are never encrypted, metadata only when flagged
fn skips_decryption(object: &Object, encrypt_metadata: bool) -> bool {
    match object {
        Object::Stream(stream) => {
            stream.dict.type_is(b"XRef") || (!encrypt_metadata && stream.dict.type_is(b"Metadata"))
        }
        _ => false,
    }
}
