//! PostgreSQL-backed `PhotoRepository` implementation using Diesel ORM.
//!
//! Reads rebuild validated domain photos from rows. `save_all` commits a
//! change set in one transaction: the owning user rows are locked first, the
//! main-photo transition is applied with guarded updates (demote before
//! promote), and any guard that touches no row aborts the transaction as a
//! conflict. The partial unique index on `photos (user_id) WHERE is_main`
//! backs the same rule for concurrent inserts.

use std::collections::BTreeSet;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::domain::ports::{PhotoRepository, PhotoRepositoryError};
use crate::domain::{
    MainPhotoTransition, Photo, PhotoChanges, PhotoDraft, PhotoId, PublicId, UserId, UserPhotos,
};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, map_write_diesel_error,
};
use super::models::{NewPhotoRow, PhotoRow};
use super::pool::{DbPool, PoolError};
use super::schema::{photos, users};

/// Diesel-backed implementation of the photo repository port.
#[derive(Clone)]
pub struct DieselPhotoRepository {
    pool: DbPool,
}

impl DieselPhotoRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PhotoRepositoryError {
    map_basic_pool_error(error, PhotoRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> PhotoRepositoryError {
    map_basic_diesel_error(
        error,
        PhotoRepositoryError::query,
        PhotoRepositoryError::connection,
    )
}

/// Failure raised inside the `save_all` transaction.
#[derive(Debug)]
enum SaveFailure {
    Diesel(diesel::result::Error),
    Conflict(String),
}

impl From<diesel::result::Error> for SaveFailure {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

fn map_save_failure(failure: SaveFailure) -> PhotoRepositoryError {
    match failure {
        SaveFailure::Conflict(message) => PhotoRepositoryError::conflict(message),
        SaveFailure::Diesel(error) => map_write_diesel_error(
            error,
            PhotoRepositoryError::query,
            PhotoRepositoryError::connection,
            PhotoRepositoryError::conflict,
        ),
    }
}

/// Convert a database row into a validated domain photo.
fn row_to_photo(row: PhotoRow) -> Result<Photo, PhotoRepositoryError> {
    let PhotoRow {
        id,
        user_id,
        url,
        public_id,
        description,
        date_added,
        is_main,
    } = row;

    let url = Url::parse(&url)
        .map_err(|err| PhotoRepositoryError::query(format!("photo {id} has invalid url: {err}")))?;
    let public_id = public_id
        .map(PublicId::new)
        .transpose()
        .map_err(|err| PhotoRepositoryError::query(err.to_string()))?;

    Photo::new(PhotoDraft {
        id: PhotoId::from_uuid(id),
        user_id: UserId::from_uuid(user_id),
        url,
        public_id,
        description,
        date_added,
        is_main,
    })
    .map_err(|err| PhotoRepositoryError::query(err.to_string()))
}

fn new_photo_row(photo: &Photo) -> NewPhotoRow<'_> {
    NewPhotoRow {
        id: *photo.id().as_uuid(),
        user_id: *photo.user_id().as_uuid(),
        url: photo.url().as_str(),
        public_id: photo.public_id().map(PublicId::as_str),
        description: photo.description(),
        date_added: photo.date_added(),
        is_main: photo.is_main(),
    }
}

/// Users touched by a change set, sorted so concurrent writers lock rows in
/// the same order.
fn affected_users(changes: &PhotoChanges) -> Vec<Uuid> {
    let transition = changes
        .main_transition
        .iter()
        .flat_map(|transition| transition.demoted.iter().chain([&transition.promoted]));
    changes
        .added
        .iter()
        .chain(transition)
        .chain(changes.removed.iter())
        .map(|photo| *photo.user_id().as_uuid())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

async fn lock_users(conn: &mut AsyncPgConnection, user_ids: &[Uuid]) -> Result<(), SaveFailure> {
    if user_ids.is_empty() {
        return Ok(());
    }
    let locked: Vec<Uuid> = users::table
        .filter(users::id.eq_any(user_ids))
        .order(users::id)
        .select(users::id)
        .for_update()
        .load(conn)
        .await?;
    if locked.len() != user_ids.len() {
        return Err(SaveFailure::Conflict("user no longer exists".to_owned()));
    }
    Ok(())
}

async fn apply_transition(
    conn: &mut AsyncPgConnection,
    transition: &MainPhotoTransition,
) -> Result<(), SaveFailure> {
    let promoted = &transition.promoted;
    let user_id = *promoted.user_id().as_uuid();

    match &transition.demoted {
        Some(demoted) => {
            let demoted_rows = diesel::update(
                photos::table
                    .filter(photos::id.eq(demoted.id().as_uuid()))
                    .filter(photos::user_id.eq(user_id))
                    .filter(photos::is_main.eq(true)),
            )
            .set(photos::is_main.eq(false))
            .execute(conn)
            .await?;
            if demoted_rows == 0 {
                return Err(SaveFailure::Conflict(format!(
                    "photo {} is no longer the main photo",
                    demoted.id()
                )));
            }
        }
        None => {
            let existing: Option<Uuid> = photos::table
                .filter(photos::user_id.eq(user_id))
                .filter(photos::is_main.eq(true))
                .select(photos::id)
                .first(conn)
                .await
                .optional()?;
            if let Some(existing) = existing {
                return Err(SaveFailure::Conflict(format!(
                    "user {user_id} already has main photo {existing}"
                )));
            }
        }
    }

    let promoted_rows = diesel::update(
        photos::table
            .filter(photos::id.eq(promoted.id().as_uuid()))
            .filter(photos::user_id.eq(user_id))
            .filter(photos::is_main.eq(false)),
    )
    .set(photos::is_main.eq(true))
    .execute(conn)
    .await?;
    if promoted_rows == 0 {
        return Err(SaveFailure::Conflict(format!(
            "photo {} cannot be promoted",
            promoted.id()
        )));
    }
    Ok(())
}

async fn apply_changes(
    conn: &mut AsyncPgConnection,
    changes: &PhotoChanges,
) -> Result<(), SaveFailure> {
    lock_users(conn, &affected_users(changes)).await?;

    if let Some(transition) = &changes.main_transition {
        apply_transition(conn, transition).await?;
    }

    if !changes.added.is_empty() {
        let rows: Vec<NewPhotoRow<'_>> = changes.added.iter().map(new_photo_row).collect();
        diesel::insert_into(photos::table)
            .values(&rows)
            .execute(conn)
            .await?;
    }

    for photo in &changes.removed {
        let deleted = diesel::delete(
            photos::table
                .filter(photos::id.eq(photo.id().as_uuid()))
                .filter(photos::user_id.eq(photo.user_id().as_uuid()))
                .filter(photos::is_main.eq(false)),
        )
        .execute(conn)
        .await?;
        if deleted == 0 {
            return Err(SaveFailure::Conflict(format!(
                "photo {} is missing or became the main photo",
                photo.id()
            )));
        }
    }
    Ok(())
}

#[async_trait]
impl PhotoRepository for DieselPhotoRepository {
    async fn find_user_photos(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserPhotos>, PhotoRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let known: Option<Uuid> = users::table
            .filter(users::id.eq(user_id.as_uuid()))
            .select(users::id)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        if known.is_none() {
            return Ok(None);
        }

        let rows: Vec<PhotoRow> = photos::table
            .filter(photos::user_id.eq(user_id.as_uuid()))
            .order((photos::date_added.asc(), photos::id.asc()))
            .select(PhotoRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let photos = rows
            .into_iter()
            .map(row_to_photo)
            .collect::<Result<Vec<_>, _>>()?;
        UserPhotos::new(user_id.clone(), photos)
            .map(Some)
            .map_err(|err| PhotoRepositoryError::query(err.to_string()))
    }

    async fn find_photo(&self, photo_id: &PhotoId) -> Result<Option<Photo>, PhotoRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = photos::table
            .filter(photos::id.eq(photo_id.as_uuid()))
            .select(PhotoRow::as_select())
            .first::<PhotoRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_photo).transpose()
    }

    async fn find_main_photo(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Photo>, PhotoRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = photos::table
            .filter(photos::user_id.eq(user_id.as_uuid()))
            .filter(photos::is_main.eq(true))
            .select(PhotoRow::as_select())
            .first::<PhotoRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_photo).transpose()
    }

    async fn save_all(&self, changes: &PhotoChanges) -> Result<(), PhotoRepositoryError> {
        if changes.is_empty() {
            return Ok(());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| async move { apply_changes(conn, changes).await }.scope_boxed())
            .await
            .map_err(|failure| {
                debug!(?failure, "photo change set rolled back");
                map_save_failure(failure)
            })
    }
}

#[cfg(test)]
mod tests {
    //! Row conversion and change-set helpers. Transactions, row locks and the
    //! main-photo index are covered by `tests/diesel_photo_repository.rs`.

    use chrono::{TimeZone, Utc};
    use diesel::result::Error as DieselError;
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn row() -> PhotoRow {
        PhotoRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            url: "https://res.cloudinary.com/demo/image/upload/v1/profiles/a.jpg".to_owned(),
            public_id: Some("profiles/a".to_owned()),
            description: "at the summit".to_owned(),
            date_added: Utc
                .with_ymd_and_hms(2025, 3, 1, 12, 0, 0)
                .single()
                .expect("valid timestamp"),
            is_main: true,
        }
    }

    fn photo_for(user_id: Uuid, is_main: bool) -> Photo {
        Photo::new(PhotoDraft {
            id: PhotoId::random(),
            user_id: UserId::from_uuid(user_id),
            url: Url::parse("https://img.example/p.jpg").expect("fixture url"),
            public_id: None,
            description: String::new(),
            date_added: Utc::now(),
            is_main,
        })
        .expect("valid photo")
    }

    #[rstest]
    fn row_converts_to_photo(row: PhotoRow) {
        let expected_id = row.id;
        let photo = row_to_photo(row).expect("row converts");

        assert_eq!(photo.id(), PhotoId::from_uuid(expected_id));
        assert_eq!(photo.public_id().map(PublicId::as_str), Some("profiles/a"));
        assert_eq!(photo.description(), "at the summit");
        assert!(photo.is_main());
    }

    #[rstest]
    fn row_with_invalid_url_is_a_query_error(mut row: PhotoRow) {
        row.url = "not a url".to_owned();
        let err = row_to_photo(row).expect_err("invalid url rejected");
        assert!(matches!(err, PhotoRepositoryError::Query { .. }));
    }

    #[rstest]
    fn row_with_oversized_description_is_a_query_error(mut row: PhotoRow) {
        row.description = "x".repeat(501);
        let err = row_to_photo(row).expect_err("oversized description rejected");
        assert!(matches!(err, PhotoRepositoryError::Query { .. }));
    }

    #[rstest]
    fn insert_row_borrows_photo_fields(row: PhotoRow) {
        let photo = row_to_photo(row).expect("row converts");
        let insert = new_photo_row(&photo);

        assert_eq!(insert.id, *photo.id().as_uuid());
        assert_eq!(insert.url, photo.url().as_str());
        assert_eq!(insert.public_id, Some("profiles/a"));
        assert!(insert.is_main);
    }

    #[rstest]
    fn affected_users_are_sorted_and_unique() {
        let first = Uuid::from_u128(1);
        let second = Uuid::from_u128(2);
        let changes = PhotoChanges {
            added: vec![photo_for(second, false)],
            main_transition: Some(MainPhotoTransition {
                demoted: Some(photo_for(first, false)),
                promoted: photo_for(first, true),
            }),
            removed: vec![photo_for(second, false)],
        };

        assert_eq!(affected_users(&changes), vec![first, second]);
    }

    #[rstest]
    fn empty_change_set_touches_no_users() {
        assert!(affected_users(&PhotoChanges::default()).is_empty());
    }

    #[rstest]
    #[case::conflict(SaveFailure::Conflict("stale".to_owned()), "Conflict")]
    #[case::not_found(SaveFailure::Diesel(DieselError::NotFound), "Query")]
    fn save_failures_map_to_repository_errors(
        #[case] failure: SaveFailure,
        #[case] expected: &str,
    ) {
        let mapped = map_save_failure(failure);
        let matched = match mapped {
            PhotoRepositoryError::Conflict { .. } => "Conflict",
            PhotoRepositoryError::Query { .. } => "Query",
            PhotoRepositoryError::Connection { .. } => "Connection",
        };
        assert_eq!(matched, expected);
    }
}
