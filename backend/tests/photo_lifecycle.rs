//! End-to-end photo lifecycle over the in-memory repository.
//!
//! Exercises `PhotoService` through its driving ports with a recording media
//! store, checking the main-photo rules and media store side effects together.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use photos_backend::domain::ports::{
    AddPhotoRequest, DeletePhotoRequest, DeletionOutcome, MediaStoreError, PhotoCommand,
    PhotoQuery, PhotoRepository, SetMainPhotoRequest,
};
use photos_backend::domain::{ErrorCode, ImageTransform, ImageUpload, Photo, PhotoService, UserId};
use photos_backend::outbound::memory::InMemoryPhotoRepository;
use photos_backend::test_support::{MutableClock, RecordingMediaStore};
use rstest::{fixture, rstest};

struct Harness {
    service: PhotoService<InMemoryPhotoRepository, RecordingMediaStore>,
    repo: Arc<InMemoryPhotoRepository>,
    media: Arc<RecordingMediaStore>,
    clock: Arc<MutableClock>,
    owner: UserId,
}

impl Harness {
    async fn add(&self, description: Option<&str>) -> Result<Photo, photos_backend::domain::Error> {
        self.clock.advance_seconds(60);
        self.service
            .add_photo(AddPhotoRequest {
                owner_id: self.owner.clone(),
                caller_id: self.owner.clone(),
                upload: ImageUpload::new(vec![0xFF, 0xD8, 0xFF]).expect("non-empty upload"),
                description: description.map(str::to_owned),
            })
            .await
    }

    async fn set_main(&self, photo: &Photo) -> Result<(), photos_backend::domain::Error> {
        self.service
            .set_main_photo(SetMainPhotoRequest {
                owner_id: self.owner.clone(),
                caller_id: self.owner.clone(),
                photo_id: photo.id(),
            })
            .await
    }

    async fn delete(&self, photo: &Photo) -> Result<(), photos_backend::domain::Error> {
        self.service
            .delete_photo(DeletePhotoRequest {
                owner_id: self.owner.clone(),
                caller_id: self.owner.clone(),
                photo_id: photo.id(),
            })
            .await
    }

    async fn main_ids(&self) -> Vec<photos_backend::domain::PhotoId> {
        self.service
            .list_photos(&self.owner)
            .await
            .expect("list succeeds")
            .iter()
            .filter(|photo| photo.is_main())
            .map(Photo::id)
            .collect()
    }
}

#[fixture]
fn harness() -> Harness {
    let repo = Arc::new(InMemoryPhotoRepository::new());
    let media = Arc::new(RecordingMediaStore::new());
    let clock = Arc::new(MutableClock::new(
        Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp"),
    ));
    let service = PhotoService::new(repo.clone(), media.clone(), clock.clone());
    Harness {
        service,
        repo,
        media,
        clock,
        owner: UserId::random(),
    }
}

#[rstest]
#[tokio::test]
async fn first_upload_becomes_main_with_profile_transform(harness: Harness) {
    let photo = harness.add(Some("first")).await.expect("add succeeds");

    assert!(photo.is_main());
    assert_eq!(photo.description(), "first");
    assert_eq!(
        photo.public_id().map(|id| id.as_str()),
        Some("recorded/1")
    );
    assert_eq!(
        harness.media.upload_transforms(),
        vec![ImageTransform::profile_thumbnail()]
    );
    let main = harness
        .service
        .main_photo(&harness.owner)
        .await
        .expect("main photo exists");
    assert_eq!(main, photo);
}

#[rstest]
#[tokio::test]
async fn promote_then_delete_follows_main_photo(harness: Harness) {
    let a = harness.add(None).await.expect("add a");
    let b = harness.add(None).await.expect("add b");
    assert!(!b.is_main());

    harness.set_main(&b).await.expect("promote b");
    assert_eq!(harness.main_ids().await, vec![b.id()]);

    harness.delete(&a).await.expect("delete former main");
    let destroyed: Vec<_> = harness
        .media
        .destroyed()
        .iter()
        .map(|id| id.as_str().to_owned())
        .collect();
    assert_eq!(destroyed, vec!["recorded/1".to_owned()]);

    let err = harness.delete(&b).await.expect_err("main is protected");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message(), "you cannot delete your main photo");
    assert_eq!(harness.main_ids().await, vec![b.id()]);
}

#[rstest]
#[tokio::test]
async fn photos_are_listed_oldest_first(harness: Harness) {
    let first = harness.add(Some("one")).await.expect("add one");
    let second = harness.add(Some("two")).await.expect("add two");
    let third = harness.add(Some("three")).await.expect("add three");

    let listed = harness
        .service
        .list_photos(&harness.owner)
        .await
        .expect("list succeeds");
    let ids: Vec<_> = listed.iter().map(Photo::id).collect();
    assert_eq!(ids, vec![first.id(), second.id(), third.id()]);
}

#[rstest]
#[tokio::test]
async fn unconfirmed_remote_delete_keeps_the_record(harness: Harness) {
    let _main = harness.add(None).await.expect("add main");
    let extra = harness.add(None).await.expect("add extra");
    harness.media.answer_next_destroy(Ok(DeletionOutcome::NotDeleted {
        result: "not found".to_owned(),
    }));

    let err = harness.delete(&extra).await.expect_err("delete fails");
    assert_eq!(err.code(), ErrorCode::UpstreamFailed);
    assert_eq!(err.message(), "failed to delete photo");

    let stored = harness
        .repo
        .find_photo(&extra.id())
        .await
        .expect("lookup succeeds");
    assert_eq!(stored, Some(extra));
}

#[rstest]
#[tokio::test]
async fn failed_upload_stores_nothing(harness: Harness) {
    harness
        .media
        .fail_next_upload(MediaStoreError::timeout("no answer in 30s"));

    let err = harness.add(None).await.expect_err("upload fails");
    assert_eq!(err.code(), ErrorCode::UpstreamFailed);
    assert_eq!(err.message(), "could not add the photo");
    assert_eq!(harness.media.upload_count(), 1);
    assert!(
        harness
            .service
            .list_photos(&harness.owner)
            .await
            .expect("list succeeds")
            .is_empty()
    );

    let retried = harness.add(None).await.expect("retry succeeds");
    assert!(retried.is_main());
}

#[rstest]
#[tokio::test]
async fn another_user_cannot_change_the_collection(harness: Harness) {
    let a = harness.add(None).await.expect("add a");
    let b = harness.add(None).await.expect("add b");
    let intruder = UserId::random();

    let err = harness
        .service
        .set_main_photo(SetMainPhotoRequest {
            owner_id: harness.owner.clone(),
            caller_id: intruder.clone(),
            photo_id: b.id(),
        })
        .await
        .expect_err("intruder rejected");
    assert_eq!(err.code(), ErrorCode::Unauthorized);

    let err = harness
        .service
        .delete_photo(DeletePhotoRequest {
            owner_id: harness.owner.clone(),
            caller_id: intruder,
            photo_id: b.id(),
        })
        .await
        .expect_err("intruder rejected");
    assert_eq!(err.code(), ErrorCode::Unauthorized);

    assert_eq!(harness.main_ids().await, vec![a.id()]);
    assert!(harness.media.destroyed().is_empty());
}
