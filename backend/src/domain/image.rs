//! Image payloads and transformation policy exchanged with the media store.

use std::fmt;

use url::Url;

use super::PublicId;

/// Crop strategy applied by the media store when resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropMode {
    /// Generate a thumbnail around the gravity anchor.
    Thumb,
}

/// Anchor the crop is centred on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gravity {
    /// Centre on the largest detected face.
    Face,
}

/// Resize and crop parameters sent with an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageTransform {
    pub width: u32,
    pub height: u32,
    pub crop: CropMode,
    pub gravity: Gravity,
}

impl ImageTransform {
    /// Policy applied to every profile photo: a 500x500 face-centred thumbnail.
    pub const fn profile_thumbnail() -> Self {
        Self {
            width: 500,
            height: 500,
            crop: CropMode::Thumb,
            gravity: Gravity::Face,
        }
    }
}

impl Default for ImageTransform {
    fn default() -> Self {
        Self::profile_thumbnail()
    }
}

/// Raised when an upload cannot be accepted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageUploadError {
    #[error("uploaded image is empty")]
    Empty,
}

/// Raw image bytes received from a client.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

impl ImageUpload {
    /// Wrap uploaded bytes, rejecting empty payloads.
    ///
    /// # Examples
    /// ```
    /// use photos_backend::domain::ImageUpload;
    ///
    /// assert!(ImageUpload::new(Vec::new()).is_err());
    /// let upload = ImageUpload::new(vec![0xFF, 0xD8]).expect("non-empty upload");
    /// assert_eq!(upload.len(), 2);
    /// ```
    pub fn new(bytes: Vec<u8>) -> Result<Self, ImageUploadError> {
        if bytes.is_empty() {
            return Err(ImageUploadError::Empty);
        }
        Ok(Self {
            file_name: None,
            content_type: None,
            bytes,
        })
    }

    /// Record the client-supplied file name.
    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Record the client-supplied content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// Image bytes never reach logs.
impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Location of an image once the media store accepted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub url: Url,
    pub public_id: PublicId,
}
