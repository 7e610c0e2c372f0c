//! Uploaded image payload.

use crate::constants::{DEFAULT_IMAGE_CONTENT_TYPE, MAX_IMAGE_EXTENSION_LENGTH};

/// Binary image received from a client, not yet stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Original file name as sent by the client
    pub file_name: Option<String>,
    /// MIME type as sent by the client
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: Option<String>, content_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name,
            content_type: content_type
                .filter(|ct| !ct.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_IMAGE_CONTENT_TYPE.to_string()),
            bytes,
        }
    }

    /// Lowercased extension of the original file name, if it looks sane.
    ///
    /// Only short ASCII alphanumeric extensions are returned so the value
    /// can be embedded in an object key as-is.
    pub fn extension(&self) -> Option<String> {
        let name = self.file_name.as_deref()?;
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty()
            || ext.is_empty()
            || ext.len() > MAX_IMAGE_EXTENSION_LENGTH
            || !ext.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
