//! Port for the remote image-hosting service.
//!
//! Adapters upload image bytes with a resize policy and delete hosted media by
//! public id. A deletion the store answers but does not confirm is reported as
//! [`DeletionOutcome::NotDeleted`] rather than an error, so callers decide how
//! to treat it.

use async_trait::async_trait;
use url::Url;
use uuid::Uuid;

use crate::domain::{ImageTransform, ImageUpload, PublicId, UploadedImage};

use super::define_port_error;

define_port_error! {
    /// Errors raised by media store adapters.
    pub enum MediaStoreError {
        /// The request could not be delivered or the store failed.
        Transport { message: String } =>
            "media store transport failed: {message}",
        /// The store did not answer in time.
        Timeout { message: String } =>
            "media store request timed out: {message}",
        /// The store refused the request (bad credentials, invalid image).
        Rejected { message: String } =>
            "media store rejected the request: {message}",
        /// The store answered with a payload the adapter could not read.
        Decode { message: String } =>
            "media store response could not be decoded: {message}",
    }
}

/// Result of a delete call the store answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionOutcome {
    /// The store confirmed the media is gone.
    Deleted,
    /// The store answered with a result other than confirmation.
    NotDeleted { result: String },
}

/// Port for uploading and deleting hosted images.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Upload `image`, applying `transform`, and return where it lives.
    async fn upload(
        &self,
        image: &ImageUpload,
        transform: &ImageTransform,
    ) -> Result<UploadedImage, MediaStoreError>;

    /// Delete hosted media by public id.
    async fn destroy(&self, public_id: &PublicId) -> Result<DeletionOutcome, MediaStoreError>;
}

/// Fixture implementation that accepts every upload and delete.
///
/// Hosted URLs point at the reserved `.invalid` domain.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMediaStore;

#[async_trait]
impl MediaStore for FixtureMediaStore {
    async fn upload(
        &self,
        _image: &ImageUpload,
        transform: &ImageTransform,
    ) -> Result<UploadedImage, MediaStoreError> {
        let key = Uuid::new_v4();
        let url = Url::parse(&format!(
            "https://media.invalid/w_{},h_{}/{key}.jpg",
            transform.width, transform.height
        ))
        .map_err(|err| MediaStoreError::decode(err.to_string()))?;
        let public_id = PublicId::new(format!("fixture/{key}"))
            .map_err(|err| MediaStoreError::decode(err.to_string()))?;
        Ok(UploadedImage { url, public_id })
    }

    async fn destroy(&self, _public_id: &PublicId) -> Result<DeletionOutcome, MediaStoreError> {
        Ok(DeletionOutcome::Deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn fixture_upload_returns_hosted_location() {
        let upload = ImageUpload::new(vec![1, 2, 3]).expect("non-empty upload");
        let uploaded = FixtureMediaStore
            .upload(&upload, &ImageTransform::profile_thumbnail())
            .await
            .expect("fixture upload succeeds");

        assert_eq!(uploaded.url.scheme(), "https");
        assert!(uploaded.url.path().contains("w_500,h_500"));
        assert!(uploaded.public_id.as_str().starts_with("fixture/"));
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_destroy_confirms_deletion() {
        let public_id = PublicId::new("fixture/a").expect("public id");
        let outcome = FixtureMediaStore
            .destroy(&public_id)
            .await
            .expect("fixture destroy succeeds");
        assert_eq!(outcome, DeletionOutcome::Deleted);
    }

    #[rstest]
    fn rejected_error_formats_message() {
        let err = MediaStoreError::rejected("invalid signature");
        assert!(err.to_string().contains("invalid signature"));
    }
}
