//! Shared test doubles for unit and integration tests.
//!
//! Compiled only with the `test-support` feature.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;
use url::Url;

use crate::domain::ports::{DeletionOutcome, MediaStore, MediaStoreError};
use crate::domain::{ImageTransform, ImageUpload, PublicId, UploadedImage};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(_) => panic!("test double mutex poisoned"),
    }
}

/// Clock that only moves when told to.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance_seconds(&self, seconds: i64) {
        *lock(&self.0) += TimeDelta::seconds(seconds);
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *lock(&self.0)
    }
}

/// Media store that records every call and answers from a script.
///
/// Uploads succeed with sequential public ids (`recorded/1`, `recorded/2`,
/// ...) unless a failure was queued. Deletes confirm unless an outcome was
/// queued.
#[derive(Default)]
pub struct RecordingMediaStore {
    uploads: Mutex<Vec<ImageTransform>>,
    destroyed: Mutex<Vec<PublicId>>,
    upload_failures: Mutex<VecDeque<MediaStoreError>>,
    destroy_results: Mutex<VecDeque<Result<DeletionOutcome, MediaStoreError>>>,
}

impl RecordingMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next upload with `error`.
    pub fn fail_next_upload(&self, error: MediaStoreError) {
        lock(&self.upload_failures).push_back(error);
    }

    /// Answer the next delete with `result`.
    pub fn answer_next_destroy(&self, result: Result<DeletionOutcome, MediaStoreError>) {
        lock(&self.destroy_results).push_back(result);
    }

    /// Number of upload attempts, failed ones included.
    pub fn upload_count(&self) -> usize {
        lock(&self.uploads).len()
    }

    /// Transforms sent with each upload attempt.
    pub fn upload_transforms(&self) -> Vec<ImageTransform> {
        lock(&self.uploads).clone()
    }

    /// Public ids passed to every delete attempt.
    pub fn destroyed(&self) -> Vec<PublicId> {
        lock(&self.destroyed).clone()
    }
}

#[async_trait]
impl MediaStore for RecordingMediaStore {
    async fn upload(
        &self,
        _image: &ImageUpload,
        transform: &ImageTransform,
    ) -> Result<UploadedImage, MediaStoreError> {
        let attempt = {
            let mut uploads = lock(&self.uploads);
            uploads.push(*transform);
            uploads.len()
        };
        if let Some(error) = lock(&self.upload_failures).pop_front() {
            return Err(error);
        }
        let url = Url::parse(&format!("https://media.invalid/recorded/{attempt}.jpg"))
            .map_err(|err| MediaStoreError::decode(err.to_string()))?;
        let public_id = PublicId::new(format!("recorded/{attempt}"))
            .map_err(|err| MediaStoreError::decode(err.to_string()))?;
        Ok(UploadedImage { url, public_id })
    }

    async fn destroy(&self, public_id: &PublicId) -> Result<DeletionOutcome, MediaStoreError> {
        lock(&self.destroyed).push(public_id.clone());
        lock(&self.destroy_results)
            .pop_front()
            .unwrap_or(Ok(DeletionOutcome::Deleted))
    }
}
