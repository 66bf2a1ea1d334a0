//! Driving port for photo reads.

use async_trait::async_trait;

use crate::domain::{Error, Photo, PhotoId, UserId};

/// Domain use-case port for reading photos.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PhotoQuery: Send + Sync {
    /// Fetch a single photo.
    async fn get_photo(&self, photo_id: &PhotoId) -> Result<Photo, Error>;

    /// List every photo of a user, oldest first.
    async fn list_photos(&self, user_id: &UserId) -> Result<Vec<Photo>, Error>;

    /// Fetch a user's main photo.
    async fn main_photo(&self, user_id: &UserId) -> Result<Photo, Error>;
}
