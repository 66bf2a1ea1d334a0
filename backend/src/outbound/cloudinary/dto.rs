//! DTOs for decoding Cloudinary upload and destroy responses.

use serde::Deserialize;
use url::Url;

use crate::domain::ports::DeletionOutcome;
use crate::domain::{PublicId, UploadedImage};

#[derive(Debug, Deserialize)]
pub(super) struct UploadResponseDto {
    pub(super) secure_url: String,
    pub(super) public_id: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct DestroyResponseDto {
    pub(super) result: String,
}

impl UploadResponseDto {
    pub(super) fn into_uploaded_image(self) -> Result<UploadedImage, String> {
        let url = Url::parse(&self.secure_url)
            .map_err(|err| format!("secure_url {:?} is not a URL: {err}", self.secure_url))?;
        let public_id = PublicId::new(self.public_id).map_err(|err| err.to_string())?;
        Ok(UploadedImage { url, public_id })
    }
}

impl DestroyResponseDto {
    pub(super) fn into_outcome(self) -> DeletionOutcome {
        if self.result == "ok" {
            DeletionOutcome::Deleted
        } else {
            DeletionOutcome::NotDeleted {
                result: self.result,
            }
        }
    }
}
