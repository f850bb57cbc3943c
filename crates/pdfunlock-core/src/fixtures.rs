//! Sample documents for tests
//!
//! Builds one-page PDFs in memory and encrypts them with the standard
//! security handler. Every string is encrypted, including those nested in
//! dictionaries and arrays such as the page annotation's `/Contents`.

use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::security::{self, Rc4};

const FILE_ID: [u8; 16] = *b"pdfunlock-sample";
const PERMISSIONS: i32 = -4;

/// Encryption settings for [`encrypt`]
#[derive(Debug, Clone, Copy)]
pub struct Lock<'a> {
    pub user_password: &'a str,
    pub owner_password: &'a str,
    pub revision: i64,
    /// Key length in bytes
    pub key_length: usize,
}

impl<'a> Lock<'a> {
    /// 128-bit RC4, revision 3
    pub fn rc4_128(user_password: &'a str, owner_password: &'a str) -> Self {
        Self {
            user_password,
            owner_password,
            revision: 3,
            key_length: 16,
        }
    }

    /// 40-bit RC4, revision 2
    pub fn rc4_40(user_password: &'a str, owner_password: &'a str) -> Self {
        Self {
            user_password,
            owner_password,
            revision: 2,
            key_length: 5,
        }
    }
}

/// One-page document whose page content, `/Title` and annotation note all
/// contain `title`
///
/// `title` must not contain parentheses or backslashes.
pub fn sample_document(title: &str) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let content = format!("BT /F1 24 Tf 72 720 Td ({}) Tj ET", title);
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
    let annot_id = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Text",
        "Rect" => vec![
            Object::Integer(72),
            Object::Integer(600),
            Object::Integer(92),
            Object::Integer(620),
        ],
        "Contents" => Object::string_literal(format!("Note on {}", title)),
        "MK" => dictionary! { "CA" => Object::string_literal("4") },
    });
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "Annots" => vec![Object::Reference(annot_id)],
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(612),
            Object::Integer(792),
        ],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(title),
        "Producer" => Object::string_literal("pdfunlock fixtures"),
    });

    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.trailer.set(
        "ID",
        Object::Array(vec![
            Object::String(FILE_ID.to_vec(), StringFormat::Hexadecimal),
            Object::String(FILE_ID.to_vec(), StringFormat::Hexadecimal),
        ]),
    );
    doc
}

/// Serialized unencrypted sample
pub fn plain_pdf(title: &str) -> Vec<u8> {
    save(sample_document(title))
}

/// Serialized sample encrypted with 128-bit RC4
pub fn encrypted_pdf(user_password: &str, owner_password: &str, title: &str) -> Vec<u8> {
    encrypt(
        sample_document(title),
        Lock::rc4_128(user_password, owner_password),
    )
}

/// Encrypt `doc` in place and serialize it
pub fn encrypt(mut doc: Document, lock: Lock<'_>) -> Vec<u8> {
    let user = lock.user_password.as_bytes();
    let owner_entry = security::owner_entry(
        lock.owner_password.as_bytes(),
        user,
        lock.revision,
        lock.key_length,
    );
    let key = security::file_key(
        user,
        &owner_entry,
        PERMISSIONS,
        &FILE_ID,
        lock.revision,
        lock.key_length,
    );
    let user_entry = security::user_entry(&key, &FILE_ID, lock.revision);

    for (&id, object) in doc.objects.iter_mut() {
        encrypt_object(&key, id, object);
    }

    let encrypt_id = doc.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => if lock.revision == 2 { 1 } else { 2 },
        "R" => lock.revision,
        "Length" => (lock.key_length * 8) as i64,
        "O" => Object::String(owner_entry, StringFormat::Hexadecimal),
        "U" => Object::String(user_entry, StringFormat::Hexadecimal),
        "P" => PERMISSIONS,
    });
    doc.trailer.set("Encrypt", encrypt_id);
    save(doc)
}

fn encrypt_object(key: &[u8], id: ObjectId, object: &mut Object) {
    let rc4 = Rc4::new(&security::object_key(key, id));
    match object {
        Object::Stream(stream) => {
            let sealed = rc4.apply(&stream.content);
            stream.set_content(sealed);
        }
        other => seal(&rc4, other),
    }
}

fn seal(rc4: &Rc4, value: &mut Object) {
    match value {
        Object::String(bytes, format) => {
            *bytes = rc4.apply(bytes);
            *format = StringFormat::Hexadecimal;
        }
        Object::Array(items) => items.iter_mut().for_each(|item| seal(rc4, item)),
        Object::Dictionary(dict) => dict.iter_mut().for_each(|(_, item)| seal(rc4, item)),
        _ => {}
    }
}

fn save(mut doc: Document) -> Vec<u8> {
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .expect("writing to a Vec cannot fail");
    buffer
}

/// Title stored in the `/Info` dictionary, if readable
pub fn info_title(doc: &Document) -> Option<String> {
    let info_id = doc.trailer.get(b"Info").and_then(Object::as_reference).ok()?;
    let title = doc.get_dictionary(info_id).ok()?.get(b"Title").ok()?;
    title
        .as_str()
        .ok()
        .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
}

/// `/Contents` of the first annotation on the first page
pub fn annotation_note(doc: &Document) -> Option<String> {
    let page_id = *doc.get_pages().get(&1)?;
    let annots = doc.get_dictionary(page_id).ok()?.get(b"Annots").ok()?.as_array().ok()?;
    let annot_id = annots.first()?.as_reference().ok()?;
    let note = doc.get_dictionary(annot_id).ok()?.get(b"Contents").ok()?;
    note.as_str()
        .ok()
        .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
}

/// Content stream of the first page
pub fn first_page_content(doc: &Document) -> Option<Vec<u8>> {
    let page_id = *doc.get_pages().get(&1)?;
    doc.get_page_content(page_id).ok()
}
