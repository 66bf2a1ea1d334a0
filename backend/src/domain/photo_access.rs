//! Ownership checks shared by every photo mutation.
//!
//! Identity mismatches and foreign photo ids produce the same error so a
//! caller cannot probe which photo ids exist.

use super::{Error, PhotoRuleViolation, UserId};

const UNAUTHORIZED_MESSAGE: &str = "you may only manage your own photos";

/// The single error returned for every ownership failure.
pub fn unauthorized() -> Error {
    Error::unauthorized(UNAUTHORIZED_MESSAGE)
}

/// Ensure the authenticated caller is the owner named in the request.
///
/// # Examples
/// ```
/// use photos_backend::domain::{ErrorCode, UserId, photo_access};
///
/// let owner = UserId::random();
/// assert!(photo_access::authorize_owner(&owner, &owner).is_ok());
/// let err = photo_access::authorize_owner(&UserId::random(), &owner).expect_err("mismatch");
/// assert_eq!(err.code(), ErrorCode::Unauthorized);
/// ```
pub fn authorize_owner(caller: &UserId, owner: &UserId) -> Result<(), Error> {
    if caller == owner {
        Ok(())
    } else {
        Err(unauthorized())
    }
}

/// Map aggregate rule violations onto domain errors.
///
/// `NotOwned` collapses into [`unauthorized`]; the other rules are
/// validation failures carrying the offending photo id.
pub fn rule_violation_error(violation: PhotoRuleViolation) -> Error {
    match violation {
        PhotoRuleViolation::NotOwned { .. } => unauthorized(),
        PhotoRuleViolation::AlreadyMain { photo_id } => {
            Error::invalid_request("this is already the main photo")
                .with_details(serde_json::json!({ "photoId": photo_id, "code": "already_main" }))
        }
        PhotoRuleViolation::MainPhotoProtected { photo_id } => {
            Error::invalid_request("you cannot delete your main photo").with_details(
                serde_json::json!({ "photoId": photo_id, "code": "main_photo_protected" }),
            )
        }
    }
}
