//! Mutex-guarded photo repository.
//!
//! Every user is treated as registered, so a user without photos loads as an
//! empty collection. `save_all` validates the whole change set against the
//! current state before applying any of it, and rejects stale main-photo
//! transitions with [`PhotoRepositoryError::Conflict`].

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{PhotoRepository, PhotoRepositoryError};
use crate::domain::{Photo, PhotoChanges, PhotoId, UserId, UserPhotos};

/// In-memory [`PhotoRepository`].
#[derive(Debug, Default)]
pub struct InMemoryPhotoRepository {
    photos: Mutex<HashMap<PhotoId, Photo>>,
}

impl InMemoryPhotoRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository holding `photos`.
    pub fn with_photos(photos: impl IntoIterator<Item = Photo>) -> Self {
        Self {
            photos: Mutex::new(photos.into_iter().map(|photo| (photo.id(), photo)).collect()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<PhotoId, Photo>>, PhotoRepositoryError> {
        self.photos
            .lock()
            .map_err(|_| PhotoRepositoryError::query("photo store lock poisoned"))
    }
}

fn main_of<'a>(photos: &'a HashMap<PhotoId, Photo>, user_id: &UserId) -> Option<&'a Photo> {
    photos
        .values()
        .find(|photo| photo.user_id() == user_id && photo.is_main())
}

fn apply(
    photos: &mut HashMap<PhotoId, Photo>,
    changes: &PhotoChanges,
) -> Result<(), PhotoRepositoryError> {
    if let Some(transition) = &changes.main_transition {
        let promoted = &transition.promoted;
        match &transition.demoted {
            Some(demoted) => {
                let current = photos.get(&demoted.id()).filter(|photo| photo.is_main());
                if current.is_none() {
                    return Err(PhotoRepositoryError::conflict(format!(
                        "photo {} is no longer the main photo",
                        demoted.id()
                    )));
                }
                photos.insert(demoted.id(), demoted.clone());
            }
            None => {
                if let Some(existing) = main_of(photos, promoted.user_id()) {
                    return Err(PhotoRepositoryError::conflict(format!(
                        "user {} already has main photo {}",
                        promoted.user_id(),
                        existing.id()
                    )));
                }
            }
        }
        let current = photos
            .get(&promoted.id())
            .filter(|photo| !photo.is_main());
        if current.is_none() {
            return Err(PhotoRepositoryError::conflict(format!(
                "photo {} cannot be promoted",
                promoted.id()
            )));
        }
        photos.insert(promoted.id(), promoted.clone());
    }

    for photo in &changes.added {
        if photos.contains_key(&photo.id()) {
            return Err(PhotoRepositoryError::query(format!(
                "photo {} already exists",
                photo.id()
            )));
        }
        if photo.is_main() && main_of(photos, photo.user_id()).is_some() {
            return Err(PhotoRepositoryError::conflict(format!(
                "user {} already has a main photo",
                photo.user_id()
            )));
        }
        photos.insert(photo.id(), photo.clone());
    }

    for photo in &changes.removed {
        match photos.get(&photo.id()) {
            Some(current) if current.is_main() => {
                return Err(PhotoRepositoryError::conflict(format!(
                    "photo {} became the main photo",
                    photo.id()
                )));
            }
            Some(_) => {
                photos.remove(&photo.id());
            }
            None => {
                return Err(PhotoRepositoryError::conflict(format!(
                    "photo {} was already removed",
                    photo.id()
                )));
            }
        }
    }
    Ok(())
}

#[async_trait]
impl PhotoRepository for InMemoryPhotoRepository {
    async fn find_user_photos(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserPhotos>, PhotoRepositoryError> {
        let owned: Vec<Photo> = self
            .lock()?
            .values()
            .filter(|photo| photo.user_id() == user_id)
            .cloned()
            .collect();
        UserPhotos::new(user_id.clone(), owned)
            .map(Some)
            .map_err(|error| PhotoRepositoryError::query(error.to_string()))
    }

    async fn find_photo(&self, photo_id: &PhotoId) -> Result<Option<Photo>, PhotoRepositoryError> {
        Ok(self.lock()?.get(photo_id).cloned())
    }

    async fn find_main_photo(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Photo>, PhotoRepositoryError> {
        Ok(main_of(&*self.lock()?, user_id).cloned())
    }

    async fn save_all(&self, changes: &PhotoChanges) -> Result<(), PhotoRepositoryError> {
        let mut guard = self.lock()?;
        let mut staged = guard.clone();
        apply(&mut staged, changes)?;
        *guard = staged;
        Ok(())
    }
}
