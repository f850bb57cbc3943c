//! Standard security handler (RC4, revisions 2 and 3)
//!
//! - reading the `/Encrypt` parameters and rejecting other schemes
//! - checking a password against `/U` and deriving the file key
//! - recovering the user password from the owner password
//! - decrypting every string and stream of an object, nested ones included
//!
//! The forward direction (owner entry) is only needed to build fixtures.

use lopdf::{Document, Object};
use md5::{Digest, Md5};

use crate::error::LoadError;

/// Password padding string from the PDF reference
pub const PAD_BYTES: [u8; 32] = [
    0x28, 0xBF, 0x4E, 0x5E, 0x4E, 0x75, 0x8A, 0x41, 0x64, 0x00, 0x4E, 0x56, 0xFF, 0xFA, 0x01, 0x08,
    0x2E, 0x2E, 0x00, 0xB6, 0xD0, 0x68, 0x3E, 0x80, 0x2F, 0x0C, 0xA9, 0xFE, 0x64, 0x53, 0x69, 0x7A,
];

/// RC4 keystream
pub struct Rc4 {
    state: [u8; 256],
}

impl Rc4 {
    /// `key` must be 1..=256 bytes long
    pub fn new(key: &[u8]) -> Self {
        let mut state = [0u8; 256];
        for (i, slot) in state.iter_mut().enumerate() {
            *slot = i as u8;
        }

        let mut j = 0u8;
        for i in 0..256 {
            j = j.wrapping_add(state[i]).wrapping_add(key[i % key.len()]);
            state.swap(i, j as usize);
        }

        Self { state }
    }

    /// Encrypts or decrypts `input` (the cipher is symmetric)
    pub fn apply(&self, input: &[u8]) -> Vec<u8> {
        let mut state = self.state;
        let (mut i, mut j) = (0u8, 0u8);
        input
            .iter()
            .map(|byte| {
                i = i.wrapping_add(1);
                j = j.wrapping_add(state[i as usize]);
                state.swap(i as usize, j as usize);
                let k = state[state[i as usize].wrapping_add(state[j as usize]) as usize];
                byte ^ k
            })
            .collect()
    }
}

/// Pad or truncate a password to exactly 32 bytes
pub fn pad_password(password: &[u8]) -> [u8; 32] {
    let len = password.len().min(32);
    let mut padded = [0u8; 32];
    padded[..len].copy_from_slice(&password[..len]);
    padded[len..].copy_from_slice(&PAD_BYTES[..32 - len]);
    padded
}

/// Parameters of a standard `/Encrypt` dictionary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityParams {
    pub version: i64,
    pub revision: i64,
    /// Key length in bytes
    pub key_length: usize,
    pub owner_entry: Vec<u8>,
    pub user_entry: Vec<u8>,
    pub permissions: i32,
    pub file_id: Vec<u8>,
}

impl SecurityParams {
    /// Read the parameters, failing for anything other than RC4 V1/V2 R2/R3
    pub fn from_document(doc: &Document) -> Result<Self, LoadError> {
        let dict = doc
            .get_encrypted()
            .map_err(|e| LoadError::Corrupt(format!("Unreadable /Encrypt dictionary: {}", e)))?;

        let filter = dict
            .get(b"Filter")
            .and_then(Object::as_name_str)
            .unwrap_or("Standard");
        if filter != "Standard" {
            return Err(LoadError::UnsupportedEncryption(format!(
                "security handler /{} is not supported",
                filter
            )));
        }

        let version = dict.get(b"V").and_then(Object::as_i64).unwrap_or(0);
        if !(1..=2).contains(&version) {
            return Err(LoadError::UnsupportedEncryption(format!(
                "algorithm version {} is not supported (only RC4 V1/V2)",
                version
            )));
        }

        let revision = dict
            .get(b"R")
            .and_then(Object::as_i64)
            .map_err(|_| LoadError::Corrupt("missing encryption revision".into()))?;
        if !(2..=3).contains(&revision) {
            return Err(LoadError::UnsupportedEncryption(format!(
                "revision {} is not supported",
                revision
            )));
        }

        let bits = dict.get(b"Length").and_then(Object::as_i64).unwrap_or(40);
        if !(40..=128).contains(&bits) || bits % 8 != 0 {
            return Err(LoadError::UnsupportedEncryption(format!(
                "key length of {} bits is not supported",
                bits
            )));
        }
        // Revision 2 always uses 40-bit keys regardless of /Length
        let key_length = if revision == 2 { 5 } else { bits as usize / 8 };

        let owner_entry = string_entry(dict.get(b"O"), "/O")?;
        let user_entry = string_entry(dict.get(b"U"), "/U")?;
        let permissions = dict
            .get(b"P")
            .and_then(Object::as_i64)
            .map_err(|_| LoadError::Corrupt("missing permissions (/P)".into()))?
            as i32;

        let file_id = doc
            .trailer
            .get(b"ID")
            .and_then(Object::as_array)
            .ok()
            .and_then(|ids| ids.first())
            .and_then(|id| id.as_str().ok())
            .map(<[u8]>::to_vec)
            .ok_or_else(|| LoadError::Corrupt("missing file identifier (/ID)".into()))?;

        Ok(Self {
            version,
            revision,
            key_length,
            owner_entry,
            user_entry,
            permissions,
            file_id,
        })
    }

    /// File key for `user_password`, or `None` if it does not match `/U`
    pub fn user_key(&self, user_password: &[u8]) -> Option<Vec<u8>> {
        let key = file_key(
            user_password,
            &self.owner_entry,
            self.permissions,
            &self.file_id,
            self.revision,
            self.key_length,
        );
        let expected = user_entry(&key, &self.file_id, self.revision);
        // Revision 3 only fixes the first 16 bytes of /U
        let checked = if self.revision == 2 { 32 } else { 16 };
        let matches = self.user_entry.len() >= checked
            && expected.get(..checked) == self.user_entry.get(..checked);
        matches.then_some(key)
    }

    /// Recover the padded user password from the owner password
    ///
    /// Feed the result to [`SecurityParams::user_key`].
    pub fn user_password_from_owner(&self, owner_password: &[u8]) -> Vec<u8> {
        let key = owner_key(owner_password, self.revision, self.key_length);
        if self.revision == 2 {
            return Rc4::new(&key).apply(&self.owner_entry);
        }
        (0..=19u8).rev().fold(self.owner_entry.clone(), |data, round| {
            Rc4::new(&xor_key(&key, round)).apply(&data)
        })
    }
}

fn string_entry(entry: lopdf::Result<&Object>, name: &str) -> Result<Vec<u8>, LoadError> {
    entry
        .and_then(Object::as_str)
        .map(<[u8]>::to_vec)
        .map_err(|_| LoadError::Corrupt(format!("missing {} entry", name)))
}

fn xor_key(key: &[u8], round: u8) -> Vec<u8> {
    key.iter().map(|b| b ^ round).collect()
}

/// RC4 key derived from the owner password (steps a-d of the owner entry algorithm)
fn owner_key(owner_password: &[u8], revision: i64, key_length: usize) -> Vec<u8> {
    let mut digest = Md5::digest(pad_password(owner_password));
    if revision >= 3 {
        for _ in 0..50 {
            digest = Md5::digest(digest);
        }
    }
    digest[..key_length].to_vec()
}

/// Compute the `/O` entry for a new document
#[cfg(any(test, feature = "test-fixtures"))]
pub fn owner_entry(
    owner_password: &[u8],
    user_password: &[u8],
    revision: i64,
    key_length: usize,
) -> Vec<u8> {
    let owner = if owner_password.is_empty() {
        user_password
    } else {
        owner_password
    };
    let key = owner_key(owner, revision, key_length);
    let padded_user = pad_password(user_password).to_vec();
    if revision == 2 {
        return Rc4::new(&key).apply(&padded_user);
    }
    (0..=19u8).fold(padded_user, |data, round| {
        Rc4::new(&xor_key(&key, round)).apply(&data)
    })
}

/// Compute the file encryption key from the user password
pub fn file_key(
    user_password: &[u8],
    owner_entry: &[u8],
    permissions: i32,
    file_id: &[u8],
    revision: i64,
    key_length: usize,
) -> Vec<u8> {
    let mut hasher = Md5::new();
    hasher.update(pad_password(user_password));
    hasher.update(owner_entry);
    hasher.update((permissions as u32).to_le_bytes());
    hasher.update(file_id);
    let mut key = hasher.finalize()[..key_length].to_vec();
    if revision >= 3 {
        for _ in 0..50 {
            key = Md5::digest(&key)[..key_length].to_vec();
        }
    }
    key
}

/// Compute the `/U` entry for a file key
pub fn user_entry(file_key: &[u8], file_id: &[u8], revision: i64) -> Vec<u8> {
    if revision == 2 {
        return Rc4::new(file_key).apply(&PAD_BYTES);
    }
    let mut hasher = Md5::new();
    hasher.update(PAD_BYTES);
    hasher.update(file_id);
    let seed = hasher.finalize().to_vec();
    let mut entry = (0..=19u8).fold(seed, |data, round| {
        Rc4::new(&xor_key(file_key, round)).apply(&data)
    });
    entry.extend_from_slice(&PAD_BYTES[..16]);
    entry
}

/// Per-object RC4 key
pub fn object_key(file_key: &[u8], id: lopdf::ObjectId) -> Vec<u8> {
    let mut hasher = Md5::new();
    hasher.update(file_key);
    hasher.update(&id.0.to_le_bytes()[..3]);
    hasher.update(&id.1.to_le_bytes()[..2]);
    let len = (file_key.len() + 5).min(16);
    hasher.finalize()[..len].to_vec()
}

/// Decrypt the strings and stream content of `object` in place
///
/// Strings inside dictionaries and arrays use the key of the indirect object
/// that holds them, so `id` is the id of the top-level object.
pub fn decrypt_object(file_key: &[u8], id: lopdf::ObjectId, object: &mut Object) {
    let rc4 = Rc4::new(&object_key(file_key, id));
    match object {
        Object::Stream(stream) => {
            let plain = rc4.apply(&stream.content);
            stream.set_content(plain);
            decrypt_strings(&rc4, &mut stream.dict);
        }
        other => decrypt_value(&rc4, other),
    }
}

fn decrypt_strings(rc4: &Rc4, dict: &mut lopdf::Dictionary) {
    for (_, value) in dict.iter_mut() {
        decrypt_value(rc4, value);
    }
}

fn decrypt_value(rc4: &Rc4, value: &mut Object) {
    match value {
        Object::String(bytes, _) => *bytes = rc4.apply(bytes),
        Object::Array(items) => items.iter_mut().for_each(|item| decrypt_value(rc4, item)),
        Object::Dictionary(dict) => decrypt_strings(rc4, dict),
        _ => {}
    }
}
