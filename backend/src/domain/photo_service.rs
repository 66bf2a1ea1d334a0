//! Photo domain service.
//!
//! Implements the photo driving ports by sequencing ownership checks, the
//! [`UserPhotos`] rules, media store calls and a single atomic repository
//! commit per mutation.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{error, info, instrument, warn};

use crate::domain::photo_access::{authorize_owner, rule_violation_error};
use crate::domain::ports::{
    AddPhotoRequest, DeletePhotoRequest, DeletionOutcome, MediaStore, MediaStoreError,
    PhotoCommand, PhotoQuery, PhotoRepository, PhotoRepositoryError, SetMainPhotoRequest,
};
use crate::domain::{
    DESCRIPTION_MAX, Error, ImageTransform, NewPhoto, Photo, PhotoChanges, PhotoId, PublicId,
    UserId, UserPhotos,
};

const ADD_FAILED: &str = "could not add the photo";
const SET_MAIN_FAILED: &str = "could not set photo to main";
const DELETE_FAILED: &str = "failed to delete photo";

fn map_read_error(error: PhotoRepositoryError) -> Error {
    match error {
        PhotoRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("photo repository unavailable: {message}"))
        }
        PhotoRepositoryError::Query { message } | PhotoRepositoryError::Conflict { message } => {
            Error::internal(format!("photo repository error: {message}"))
        }
    }
}

fn map_save_error(error: PhotoRepositoryError, failure: &'static str) -> Error {
    error!(%error, "photo change set was not committed");
    match error {
        PhotoRepositoryError::Conflict { .. } => {
            Error::conflict("photos were changed concurrently; retry the request")
        }
        PhotoRepositoryError::Connection { .. } | PhotoRepositoryError::Query { .. } => {
            Error::persistence_failed(failure)
        }
    }
}

fn map_media_error(error: MediaStoreError, failure: &'static str) -> Error {
    warn!(%error, "media store call failed");
    let reason = match error {
        MediaStoreError::Transport { .. } => "transport",
        MediaStoreError::Timeout { .. } => "timeout",
        MediaStoreError::Rejected { .. } => "rejected",
        MediaStoreError::Decode { .. } => "decode",
    };
    Error::upstream_failed(failure).with_details(json!({ "reason": reason }))
}

fn validate_description(description: Option<String>) -> Result<String, Error> {
    let description = description.unwrap_or_default();
    if description.chars().count() > DESCRIPTION_MAX {
        return Err(
            Error::invalid_request(format!(
                "description must be at most {DESCRIPTION_MAX} characters"
            ))
            .with_details(json!({ "field": "description", "code": "description_too_long" })),
        );
    }
    Ok(description)
}

/// Photo service implementing [`PhotoCommand`] and [`PhotoQuery`].
///
/// Adapters may be concrete types or trait objects such as
/// `dyn PhotoRepository`.
pub struct PhotoService<R: ?Sized, M: ?Sized> {
    photo_repo: Arc<R>,
    media_store: Arc<M>,
    clock: Arc<dyn Clock>,
}

impl<R: ?Sized, M: ?Sized> Clone for PhotoService<R, M> {
    fn clone(&self) -> Self {
        Self {
            photo_repo: Arc::clone(&self.photo_repo),
            media_store: Arc::clone(&self.media_store),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R: ?Sized, M: ?Sized> PhotoService<R, M> {
    /// Create a service. Uploads always use the profile thumbnail transform.
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use mockable::DefaultClock;
    /// # use photos_backend::domain::PhotoService;
    /// # use photos_backend::domain::ports::{FixtureMediaStore, FixturePhotoRepository};
    /// let service = PhotoService::new(
    ///     Arc::new(FixturePhotoRepository),
    ///     Arc::new(FixtureMediaStore),
    ///     Arc::new(DefaultClock),
    /// );
    /// # let _ = service;
    /// ```
    pub fn new(photo_repo: Arc<R>, media_store: Arc<M>, clock: Arc<dyn Clock>) -> Self {
        Self {
            photo_repo,
            media_store,
            clock,
        }
    }
}

impl<R, M> PhotoService<R, M>
where
    R: PhotoRepository + ?Sized,
    M: MediaStore + ?Sized,
{
    async fn load_collection(&self, user_id: &UserId) -> Result<UserPhotos, Error> {
        self.photo_repo
            .find_user_photos(user_id)
            .await
            .map_err(map_read_error)?
            .ok_or_else(|| Error::not_found(format!("user {user_id} not found")))
    }

    /// Best-effort removal of media whose record could not be stored.
    async fn discard_upload(&self, public_id: &PublicId) {
        match self.media_store.destroy(public_id).await {
            Ok(DeletionOutcome::Deleted) => {
                info!(%public_id, "discarded orphaned upload");
            }
            Ok(DeletionOutcome::NotDeleted { result }) => {
                warn!(%public_id, %result, "media store kept orphaned upload");
            }
            Err(error) => {
                warn!(%public_id, %error, "failed to discard orphaned upload");
            }
        }
    }

    /// Delete hosted media. Only an explicit confirmation counts as success.
    async fn destroy_hosted(&self, public_id: &PublicId) -> Result<(), Error> {
        match self.media_store.destroy(public_id).await {
            Ok(DeletionOutcome::Deleted) => Ok(()),
            Ok(DeletionOutcome::NotDeleted { result }) => {
                warn!(%public_id, %result, "media store did not confirm deletion");
                Err(Error::upstream_failed(DELETE_FAILED)
                    .with_details(json!({ "reason": "not_deleted", "result": result })))
            }
            Err(error) => Err(map_media_error(error, DELETE_FAILED)),
        }
    }
}

#[async_trait]
impl<R, M> PhotoCommand for PhotoService<R, M>
where
    R: PhotoRepository + ?Sized,
    M: MediaStore + ?Sized,
{
    #[instrument(skip_all, fields(owner_id = %request.owner_id, bytes = request.upload.len()))]
    async fn add_photo(&self, request: AddPhotoRequest) -> Result<Photo, Error> {
        let AddPhotoRequest {
            owner_id,
            caller_id,
            upload,
            description,
        } = request;
        authorize_owner(&caller_id, &owner_id)?;
        if upload.is_empty() {
            return Err(Error::invalid_request("uploaded image is empty"));
        }
        let description = validate_description(description)?;
        let mut photos = self.load_collection(&owner_id).await?;

        let uploaded = self
            .media_store
            .upload(&upload, &ImageTransform::profile_thumbnail())
            .await
            .map_err(|error| map_media_error(error, ADD_FAILED))?;

        let added = photos.add(NewPhoto {
            id: PhotoId::random(),
            url: uploaded.url,
            public_id: Some(uploaded.public_id.clone()),
            description,
            date_added: self.clock.utc(),
        });
        let photo = match added {
            Ok(photo) => photo,
            Err(error) => {
                warn!(%error, "media store returned an unusable upload");
                self.discard_upload(&uploaded.public_id).await;
                return Err(Error::upstream_failed(ADD_FAILED));
            }
        };

        if let Err(error) = self.photo_repo.save_all(&PhotoChanges::add(photo.clone())).await {
            let mapped = map_save_error(error, ADD_FAILED);
            self.discard_upload(&uploaded.public_id).await;
            return Err(mapped);
        }

        info!(photo_id = %photo.id(), is_main = photo.is_main(), "photo added");
        Ok(photo)
    }

    #[instrument(skip_all, fields(owner_id = %request.owner_id, photo_id = %request.photo_id))]
    async fn set_main_photo(&self, request: SetMainPhotoRequest) -> Result<(), Error> {
        let SetMainPhotoRequest {
            owner_id,
            caller_id,
            photo_id,
        } = request;
        authorize_owner(&caller_id, &owner_id)?;
        let mut photos = self.load_collection(&owner_id).await?;

        let transition = photos.promote(photo_id).map_err(rule_violation_error)?;
        self.photo_repo
            .save_all(&PhotoChanges::transition(transition))
            .await
            .map_err(|error| map_save_error(error, SET_MAIN_FAILED))?;

        info!("main photo changed");
        Ok(())
    }

    #[instrument(skip_all, fields(owner_id = %request.owner_id, photo_id = %request.photo_id))]
    async fn delete_photo(&self, request: DeletePhotoRequest) -> Result<(), Error> {
        let DeletePhotoRequest {
            owner_id,
            caller_id,
            photo_id,
        } = request;
        authorize_owner(&caller_id, &owner_id)?;
        let mut photos = self.load_collection(&owner_id).await?;

        let photo = photos.remove(photo_id).map_err(rule_violation_error)?;

        match photo.public_id() {
            Some(public_id) => self.destroy_hosted(public_id).await?,
            None => info!("photo is not hosted; skipping media store"),
        }

        self.photo_repo
            .save_all(&PhotoChanges::remove(photo))
            .await
            .map_err(|error| map_save_error(error, DELETE_FAILED))?;

        info!("photo deleted");
        Ok(())
    }
}

#[async_trait]
impl<R, M> PhotoQuery for PhotoService<R, M>
where
    R: PhotoRepository + ?Sized,
    M: MediaStore + ?Sized,
{
    async fn get_photo(&self, photo_id: &PhotoId) -> Result<Photo, Error> {
        self.photo_repo
            .find_photo(photo_id)
            .await
            .map_err(map_read_error)?
            .ok_or_else(|| Error::not_found(format!("photo {photo_id} not found")))
    }

    async fn list_photos(&self, user_id: &UserId) -> Result<Vec<Photo>, Error> {
        let mut photos = self.load_collection(user_id).await?.into_photos();
        photos.sort_by_key(|photo| (photo.date_added(), *photo.id().as_uuid()));
        Ok(photos)
    }

    async fn main_photo(&self, user_id: &UserId) -> Result<Photo, Error> {
        self.photo_repo
            .find_main_photo(user_id)
            .await
            .map_err(map_read_error)?
            .ok_or_else(|| Error::not_found(format!("user {user_id} has no main photo")))
    }
}

#[cfg(test)]
#[path = "photo_service_tests.rs"]
mod tests;
