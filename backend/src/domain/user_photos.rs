//! The per-user photo collection and its main-photo rules.
//!
//! `UserPhotos` is the aggregate every mutation goes through. It decides
//! whether a new photo becomes main, which photo a promotion demotes, and
//! whether a photo may be deleted. The outcome is a [`PhotoChanges`] set that
//! a repository commits atomically.
//!
//! ## Invariants
//! - Every photo belongs to the aggregate's user.
//! - At most one photo is main; once a photo is added, exactly one is.

use chrono::{DateTime, Utc};
use url::Url;

use super::{Photo, PhotoDraft, PhotoId, PhotoValidationError, PublicId, UserId};

/// Rule violations raised by [`UserPhotos`] operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhotoRuleViolation {
    #[error("photo {photo_id} is not in this user's collection")]
    NotOwned { photo_id: PhotoId },
    #[error("photo {photo_id} is already the main photo")]
    AlreadyMain { photo_id: PhotoId },
    #[error("photo {photo_id} is the main photo and cannot be deleted")]
    MainPhotoProtected { photo_id: PhotoId },
}

/// Values needed to append a freshly uploaded photo.
#[derive(Debug, Clone)]
pub struct NewPhoto {
    pub id: PhotoId,
    pub url: Url,
    pub public_id: Option<PublicId>,
    pub description: String,
    pub date_added: DateTime<Utc>,
}

/// A main-photo handover: `demoted` loses the flag, `promoted` gains it.
///
/// Both photos carry their post-transition state. `demoted` is `None` only
/// when the user had no main photo before the promotion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainPhotoTransition {
    pub demoted: Option<Photo>,
    pub promoted: Photo,
}

/// Pending changes committed by `PhotoRepository::save_all` in one unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoChanges {
    pub added: Vec<Photo>,
    pub main_transition: Option<MainPhotoTransition>,
    pub removed: Vec<Photo>,
}

impl PhotoChanges {
    /// Change set inserting a single photo.
    pub fn add(photo: Photo) -> Self {
        Self {
            added: vec![photo],
            ..Self::default()
        }
    }

    /// Change set moving the main flag.
    pub fn transition(transition: MainPhotoTransition) -> Self {
        Self {
            main_transition: Some(transition),
            ..Self::default()
        }
    }

    /// Change set deleting a single photo record.
    pub fn remove(photo: Photo) -> Self {
        Self {
            removed: vec![photo],
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.main_transition.is_none() && self.removed.is_empty()
    }
}

/// A user's photo collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPhotos {
    user_id: UserId,
    photos: Vec<Photo>,
}

impl UserPhotos {
    /// Build the aggregate from stored photos, checking ownership and the
    /// single-main rule.
    pub fn new(user_id: UserId, photos: Vec<Photo>) -> Result<Self, PhotoValidationError> {
        if let Some(foreign) = photos.iter().find(|photo| photo.user_id() != &user_id) {
            return Err(PhotoValidationError::ForeignPhoto {
                photo_id: foreign.id(),
                user_id,
            });
        }
        if photos.iter().filter(|photo| photo.is_main()).count() > 1 {
            return Err(PhotoValidationError::MultipleMainPhotos { user_id });
        }
        Ok(Self { user_id, photos })
    }

    /// Collection for a user without photos.
    pub fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            photos: Vec::new(),
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    pub fn into_photos(self) -> Vec<Photo> {
        self.photos
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    /// The current main photo, if any.
    pub fn main_photo(&self) -> Option<&Photo> {
        self.photos.iter().find(|photo| photo.is_main())
    }

    /// Look up a photo within this collection.
    pub fn find(&self, photo_id: PhotoId) -> Option<&Photo> {
        self.photos.iter().find(|photo| photo.id() == photo_id)
    }

    /// Append a new photo. It becomes main when the user has no main photo.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use photos_backend::domain::{NewPhoto, PhotoId, UserId, UserPhotos};
    /// use url::Url;
    ///
    /// let mut photos = UserPhotos::empty(UserId::random());
    /// let first = photos
    ///     .add(NewPhoto {
    ///         id: PhotoId::random(),
    ///         url: Url::parse("https://img.example/a.jpg").expect("url"),
    ///         public_id: None,
    ///         description: String::new(),
    ///         date_added: Utc::now(),
    ///     })
    ///     .expect("valid photo");
    /// assert!(first.is_main());
    /// ```
    pub fn add(&mut self, new_photo: NewPhoto) -> Result<Photo, PhotoValidationError> {
        let NewPhoto {
            id,
            url,
            public_id,
            description,
            date_added,
        } = new_photo;
        let photo = Photo::new(PhotoDraft {
            id,
            user_id: self.user_id.clone(),
            url,
            public_id,
            description,
            date_added,
            is_main: self.main_photo().is_none(),
        })?;
        self.photos.push(photo.clone());
        Ok(photo)
    }

    /// Make `photo_id` the main photo, demoting the current one.
    pub fn promote(&mut self, photo_id: PhotoId) -> Result<MainPhotoTransition, PhotoRuleViolation> {
        let target = self
            .find(photo_id)
            .ok_or(PhotoRuleViolation::NotOwned { photo_id })?;
        if target.is_main() {
            return Err(PhotoRuleViolation::AlreadyMain { photo_id });
        }

        let mut demoted = None;
        let mut promoted = None;
        for photo in &mut self.photos {
            if photo.is_main() {
                *photo = photo.clone().with_main(false);
                demoted = Some(photo.clone());
            } else if photo.id() == photo_id {
                *photo = photo.clone().with_main(true);
                promoted = Some(photo.clone());
            }
        }

        let promoted = promoted.ok_or(PhotoRuleViolation::NotOwned { photo_id })?;
        Ok(MainPhotoTransition { demoted, promoted })
    }

    /// Return the photo if it may be deleted. The main photo is protected.
    fn ensure_deletable(&self, photo_id: PhotoId) -> Result<&Photo, PhotoRuleViolation> {
        let photo = self
            .find(photo_id)
            .ok_or(PhotoRuleViolation::NotOwned { photo_id })?;
        if photo.is_main() {
            return Err(PhotoRuleViolation::MainPhotoProtected { photo_id });
        }
        Ok(photo)
    }

    /// Drop a non-main photo from the collection.
    pub fn remove(&mut self, photo_id: PhotoId) -> Result<Photo, PhotoRuleViolation> {
        self.ensure_deletable(photo_id)?;
        let index = self
            .photos
            .iter()
            .position(|photo| photo.id() == photo_id)
            .ok_or(PhotoRuleViolation::NotOwned { photo_id })?;
        Ok(self.photos.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn new_photo(public_id: Option<&str>) -> NewPhoto {
        NewPhoto {
            id: PhotoId::random(),
            url: Url::parse("https://img.example/photo.jpg").expect("fixture url"),
            public_id: public_id.map(|id| PublicId::new(id).expect("fixture public id")),
            description: String::new(),
            date_added: Utc::now(),
        }
    }

    #[fixture]
    fn two_photos() -> (UserPhotos, PhotoId, PhotoId) {
        let mut photos = UserPhotos::empty(UserId::random());
        let a = photos.add(new_photo(Some("a"))).expect("add a").id();
        let b = photos.add(new_photo(None)).expect("add b").id();
        (photos, a, b)
    }

    fn main_ids(photos: &UserPhotos) -> Vec<PhotoId> {
        photos
            .photos()
            .iter()
            .filter(|photo| photo.is_main())
            .map(Photo::id)
            .collect()
    }

    #[rstest]
    fn first_photo_becomes_main() {
        let mut photos = UserPhotos::empty(UserId::random());
        let first = photos.add(new_photo(None)).expect("add");
        assert!(first.is_main());
        assert_eq!(main_ids(&photos), vec![first.id()]);
    }

    #[rstest]
    fn later_photos_are_not_main(two_photos: (UserPhotos, PhotoId, PhotoId)) {
        let (photos, a, b) = two_photos;
        assert_eq!(main_ids(&photos), vec![a]);
        assert!(!photos.find(b).expect("b present").is_main());
    }

    #[rstest]
    fn promote_swaps_main_flag(two_photos: (UserPhotos, PhotoId, PhotoId)) {
        let (mut photos, a, b) = two_photos;
        let transition = photos.promote(b).expect("promote b");

        assert_eq!(transition.promoted.id(), b);
        assert!(transition.promoted.is_main());
        let demoted = transition.demoted.expect("a demoted");
        assert_eq!(demoted.id(), a);
        assert!(!demoted.is_main());
        assert_eq!(main_ids(&photos), vec![b]);
    }

    #[rstest]
    fn promote_rejects_current_main(two_photos: (UserPhotos, PhotoId, PhotoId)) {
        let (mut photos, a, _) = two_photos;
        let before = photos.clone();
        assert_eq!(
            photos.promote(a),
            Err(PhotoRuleViolation::AlreadyMain { photo_id: a })
        );
        assert_eq!(photos, before);
    }

    #[rstest]
    fn promote_rejects_foreign_photo(two_photos: (UserPhotos, PhotoId, PhotoId)) {
        let (mut photos, _, _) = two_photos;
        let stranger = PhotoId::random();
        assert_eq!(
            photos.promote(stranger),
            Err(PhotoRuleViolation::NotOwned { photo_id: stranger })
        );
    }

    #[rstest]
    fn main_photo_is_protected(two_photos: (UserPhotos, PhotoId, PhotoId)) {
        let (mut photos, a, _) = two_photos;
        assert_eq!(
            photos.remove(a).map(|photo| photo.id()),
            Err(PhotoRuleViolation::MainPhotoProtected { photo_id: a })
        );
        assert_eq!(photos.len(), 2);
    }

    #[rstest]
    fn non_main_photo_is_removed(two_photos: (UserPhotos, PhotoId, PhotoId)) {
        let (mut photos, a, b) = two_photos;
        let removed = photos.remove(b).expect("remove b");
        assert_eq!(removed.id(), b);
        assert_eq!(main_ids(&photos), vec![a]);
    }

    #[rstest]
    fn rejects_photos_of_other_users(two_photos: (UserPhotos, PhotoId, PhotoId)) {
        let (photos, _, _) = two_photos;
        let result = UserPhotos::new(UserId::random(), photos.into_photos());
        assert!(matches!(
            result,
            Err(PhotoValidationError::ForeignPhoto { .. })
        ));
    }

    #[rstest]
    fn rejects_multiple_main_photos(two_photos: (UserPhotos, PhotoId, PhotoId)) {
        let (photos, _, _) = two_photos;
        let user_id = photos.user_id().clone();
        let all_main = photos
            .into_photos()
            .into_iter()
            .map(|photo| photo.with_main(true))
            .collect();
        assert_eq!(
            UserPhotos::new(user_id.clone(), all_main),
            Err(PhotoValidationError::MultipleMainPhotos { user_id })
        );
    }

    #[rstest]
    fn change_set_constructors_are_non_empty(two_photos: (UserPhotos, PhotoId, PhotoId)) {
        let (photos, a, _) = two_photos;
        let photo = photos.find(a).expect("a present").clone();
        assert!(PhotoChanges::default().is_empty());
        assert!(!PhotoChanges::add(photo.clone()).is_empty());
        assert!(!PhotoChanges::remove(photo).is_empty());
    }
}
