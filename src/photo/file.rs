//! Selected-file checks for the photo step.
//!
//! Both checks are pure and run before any decode or upload; a rejected
//! file never reaches the gateway.

use crate::error::PhotoError;

/// Maximum accepted photo size.
pub const MAX_FILE_SIZE_MB: usize = 5;
pub const MAX_FILE_SIZE_BYTES: usize = MAX_FILE_SIZE_MB * 1024 * 1024;

/// MIME types accepted for profile photos.
pub const ACCEPTED_IMAGE_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

/// A file the user picked for their profile photo.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Check MIME type and size. Terminal, non-retryable errors: the user
    /// must pick a different file.
    pub fn check(&self) -> Result<(), PhotoError> {
        if !ACCEPTED_IMAGE_TYPES.contains(&self.mime.as_str()) {
            return Err(PhotoError::UnsupportedType);
        }
        if self.bytes.len() > MAX_FILE_SIZE_BYTES {
            return Err(PhotoError::TooLarge);
        }
        Ok(())
    }
}
