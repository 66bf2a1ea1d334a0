//! Photo entity and its identifiers.
//!
//! A photo always belongs to exactly one user. Photos hosted by the media
//! store carry the store's [`PublicId`]; photos imported from elsewhere do
//! not, and deleting them never touches the media store.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use super::UserId;

/// Maximum number of characters accepted for a photo description.
pub const DESCRIPTION_MAX: usize = 500;
/// Maximum number of characters accepted for a media store public id.
pub const PUBLIC_ID_MAX: usize = 255;

/// Validation errors raised when constructing photo values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhotoValidationError {
    #[error("photo id must be a valid UUID")]
    InvalidId,
    #[error("public id must not be blank")]
    EmptyPublicId,
    #[error("public id must be at most {max} characters")]
    PublicIdTooLong { max: usize },
    #[error("description must be at most {max} characters")]
    DescriptionTooLong { max: usize },
    #[error("photo url must use http or https")]
    UnsupportedUrlScheme,
    #[error("photo {photo_id} does not belong to user {user_id}")]
    ForeignPhoto { photo_id: PhotoId, user_id: UserId },
    #[error("user {user_id} has more than one main photo")]
    MultipleMainPhotos { user_id: UserId },
}

/// Opaque photo identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoId(Uuid);

impl PhotoId {
    /// Generate a new random [`PhotoId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an already-parsed UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PhotoId {
    type Err = PhotoValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| PhotoValidationError::InvalidId)
    }
}

/// Identifier assigned by the media store to hosted media.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PublicId(String);

impl PublicId {
    /// Validate and construct a [`PublicId`].
    ///
    /// # Examples
    /// ```
    /// use photos_backend::domain::PublicId;
    ///
    /// let id = PublicId::new("profiles/abc123").expect("valid public id");
    /// assert_eq!(id.as_str(), "profiles/abc123");
    /// assert!(PublicId::new("   ").is_err());
    /// ```
    pub fn new(value: impl Into<String>) -> Result<Self, PhotoValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(PhotoValidationError::EmptyPublicId);
        }
        if value.chars().count() > PUBLIC_ID_MAX {
            return Err(PhotoValidationError::PublicIdTooLong { max: PUBLIC_ID_MAX });
        }
        Ok(Self(value))
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PublicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<PublicId> for String {
    fn from(value: PublicId) -> Self {
        value.0
    }
}

impl TryFrom<String> for PublicId {
    type Error = PhotoValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Unvalidated input for [`Photo::new`].
#[derive(Debug, Clone)]
pub struct PhotoDraft {
    pub id: PhotoId,
    pub user_id: UserId,
    pub url: Url,
    pub public_id: Option<PublicId>,
    pub description: String,
    pub date_added: DateTime<Utc>,
    pub is_main: bool,
}

/// A user's photo.
///
/// ## Invariants
/// - `url` uses the `http` or `https` scheme.
/// - `description` holds at most [`DESCRIPTION_MAX`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    id: PhotoId,
    user_id: UserId,
    url: Url,
    #[serde(skip_serializing_if = "Option::is_none")]
    public_id: Option<PublicId>,
    description: String,
    date_added: DateTime<Utc>,
    is_main: bool,
}

impl Photo {
    /// Validate a draft into a photo.
    pub fn new(draft: PhotoDraft) -> Result<Self, PhotoValidationError> {
        let PhotoDraft {
            id,
            user_id,
            url,
            public_id,
            description,
            date_added,
            is_main,
        } = draft;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(PhotoValidationError::UnsupportedUrlScheme);
        }
        if description.chars().count() > DESCRIPTION_MAX {
            return Err(PhotoValidationError::DescriptionTooLong {
                max: DESCRIPTION_MAX,
            });
        }

        Ok(Self {
            id,
            user_id,
            url,
            public_id,
            description,
            date_added,
            is_main,
        })
    }

    pub fn id(&self) -> PhotoId {
        self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Media store identifier, present only for hosted photos.
    pub fn public_id(&self) -> Option<&PublicId> {
        self.public_id.as_ref()
    }

    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    pub fn date_added(&self) -> DateTime<Utc> {
        self.date_added
    }

    pub fn is_main(&self) -> bool {
        self.is_main
    }

    pub(crate) fn with_main(mut self, is_main: bool) -> Self {
        self.is_main = is_main;
        self
    }
}
