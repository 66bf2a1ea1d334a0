//! Domain primitives, aggregates and services.
//!
//! Purpose: Define strongly typed photo entities used by the API and
//! persistence layers, and the service that enforces the main-photo rules.
//! Keep types immutable and document invariants and serialisation contracts
//! (serde) in each type's Rustdoc.
//!
//! Public surface:
//! - Error (alias to `error::Error`): transport-agnostic failure payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - Photo / PhotoId / PublicId: a stored photo and its identifiers.
//! - UserPhotos: per-user collection enforcing the main-photo invariant.
//! - PhotoService: implements the `PhotoCommand` and `PhotoQuery` ports.

pub mod error;
pub mod image;
pub mod photo;
pub mod photo_access;
mod photo_service;
pub mod ports;
pub mod trace_id;
pub mod user;
pub mod user_photos;

pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::image::{
    CropMode, Gravity, ImageTransform, ImageUpload, ImageUploadError, UploadedImage,
};
pub use self::photo::{
    DESCRIPTION_MAX, PUBLIC_ID_MAX, Photo, PhotoDraft, PhotoId, PhotoValidationError, PublicId,
};
pub use self::photo_service::PhotoService;
pub use self::trace_id::TraceId;
pub use self::user::{UserId, UserValidationError};
pub use self::user_photos::{
    MainPhotoTransition, NewPhoto, PhotoChanges, PhotoRuleViolation, UserPhotos,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use photos_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::unauthorized("login required"))
/// }
/// # assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
