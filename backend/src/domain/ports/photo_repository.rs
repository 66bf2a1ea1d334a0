//! Port for photo persistence.
//!
//! Reads return validated domain values. Writes are staged in a
//! [`PhotoChanges`] set and committed by [`PhotoRepository::save_all`] as one
//! atomic unit: either every insert, flag change and removal lands or none
//! does.

use async_trait::async_trait;

use crate::domain::{Photo, PhotoChanges, PhotoId, UserId, UserPhotos};

use super::define_port_error;

define_port_error! {
    /// Errors raised by photo repository adapters.
    pub enum PhotoRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "photo repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "photo repository query failed: {message}",
        /// A concurrent change invalidated the staged main-photo transition.
        Conflict { message: String } =>
            "photo repository write conflicted: {message}",
    }
}

/// Port for reading photo collections and committing change sets.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PhotoRepository: Send + Sync {
    /// Load a user with their photo collection. `None` when the user is unknown.
    async fn find_user_photos(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserPhotos>, PhotoRepositoryError>;

    /// Load a single photo by id.
    async fn find_photo(&self, photo_id: &PhotoId) -> Result<Option<Photo>, PhotoRepositoryError>;

    /// Load the user's current main photo.
    async fn find_main_photo(&self, user_id: &UserId)
    -> Result<Option<Photo>, PhotoRepositoryError>;

    /// Commit staged changes atomically.
    async fn save_all(&self, changes: &PhotoChanges) -> Result<(), PhotoRepositoryError>;
}

/// Fixture implementation for tests that do not exercise photo persistence.
///
/// Every user exists with an empty collection and every save succeeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePhotoRepository;

#[async_trait]
impl PhotoRepository for FixturePhotoRepository {
    async fn find_user_photos(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserPhotos>, PhotoRepositoryError> {
        Ok(Some(UserPhotos::empty(user_id.clone())))
    }

    async fn find_photo(&self, _photo_id: &PhotoId) -> Result<Option<Photo>, PhotoRepositoryError> {
        Ok(None)
    }

    async fn find_main_photo(
        &self,
        _user_id: &UserId,
    ) -> Result<Option<Photo>, PhotoRepositoryError> {
        Ok(None)
    }

    async fn save_all(&self, _changes: &PhotoChanges) -> Result<(), PhotoRepositoryError> {
        Ok(())
    }
}
