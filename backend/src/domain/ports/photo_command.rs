//! Driving port for photo mutations.
//!
//! Every request names the collection owner and the authenticated caller; the
//! service rejects mismatches before doing any work.

use async_trait::async_trait;

use crate::domain::{Error, ImageUpload, Photo, PhotoId, UserId};

/// Upload a new photo into `owner_id`'s collection.
#[derive(Debug, Clone)]
pub struct AddPhotoRequest {
    pub owner_id: UserId,
    pub caller_id: UserId,
    pub upload: ImageUpload,
    pub description: Option<String>,
}

/// Make `photo_id` the owner's main photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetMainPhotoRequest {
    pub owner_id: UserId,
    pub caller_id: UserId,
    pub photo_id: PhotoId,
}

/// Delete `photo_id` from the owner's collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePhotoRequest {
    pub owner_id: UserId,
    pub caller_id: UserId,
    pub photo_id: PhotoId,
}

/// Domain use-case port for changing a user's photos.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PhotoCommand: Send + Sync {
    /// Upload and persist a photo, returning the stored record.
    async fn add_photo(&self, request: AddPhotoRequest) -> Result<Photo, Error>;

    /// Move the main flag to the requested photo.
    async fn set_main_photo(&self, request: SetMainPhotoRequest) -> Result<(), Error>;

    /// Remove a non-main photo, deleting hosted media first when present.
    async fn delete_photo(&self, request: DeletePhotoRequest) -> Result<(), Error>;
}
