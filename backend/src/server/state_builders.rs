//! Builders for HTTP state and the adapters behind it.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::{info, warn};

use photos_backend::domain::PhotoService;
use photos_backend::domain::ports::{
    FixtureMediaStore, MediaStore, PhotoCommand, PhotoQuery, PhotoRepository,
};
use photos_backend::inbound::http::state::HttpState;
use photos_backend::outbound::cloudinary::{CloudinaryConfig, CloudinaryMediaStore};
use photos_backend::outbound::memory::InMemoryPhotoRepository;
use photos_backend::outbound::persistence::{DbPool, DieselPhotoRepository};

use super::ServerConfig;

/// Select the Diesel repository when a pool is available, otherwise keep
/// photos in memory.
pub(crate) fn build_photo_repository(pool: Option<DbPool>) -> Arc<dyn PhotoRepository> {
    select_photo_repository(pool, DieselPhotoRepository::new)
}

fn select_photo_repository<Pool, Repo>(
    pool: Option<Pool>,
    make_repo: impl FnOnce(Pool) -> Repo,
) -> Arc<dyn PhotoRepository>
where
    Repo: PhotoRepository + 'static,
{
    match pool {
        Some(pool) => Arc::new(make_repo(pool)),
        None => {
            warn!("no database configured; photos are kept in memory");
            Arc::new(InMemoryPhotoRepository::new())
        }
    }
}

/// Build the media store from Cloudinary credentials.
///
/// Without credentials, debug builds (or `allow_fixture`) fall back to the
/// fixture store, which hosts nothing.
///
/// # Errors
/// Returns [`std::io::Error`] when the client cannot be built, or when
/// credentials are missing in a release build.
pub(crate) fn build_media_store(
    config: Option<CloudinaryConfig>,
    allow_fixture: bool,
) -> std::io::Result<Arc<dyn MediaStore>> {
    match config {
        Some(config) => {
            info!(
                cloud_name = %config.cloud_name,
                signature_algorithm = %config.signature_algorithm,
                "using Cloudinary media store"
            );
            let store = CloudinaryMediaStore::new(config, Arc::new(DefaultClock))
                .map_err(|err| std::io::Error::other(format!("media store init failed: {err}")))?;
            Ok(Arc::new(store))
        }
        None if allow_fixture => {
            warn!("no Cloudinary credentials; uploads use the fixture media store");
            Ok(Arc::new(FixtureMediaStore))
        }
        None => Err(std::io::Error::other(
            "Cloudinary credentials are required (CLOUDINARY_CLOUD_NAME, CLOUDINARY_API_KEY, CLOUDINARY_API_SECRET)",
        )),
    }
}

/// Build the shared HTTP state from the configured adapters.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let service: Arc<PhotoService<dyn PhotoRepository, dyn MediaStore>> =
        Arc::new(PhotoService::new(
            config.photo_repo.clone(),
            config.media_store.clone(),
            Arc::new(DefaultClock),
        ));
    web::Data::new(HttpState::new(
        service.clone() as Arc<dyn PhotoCommand>,
        service as Arc<dyn PhotoQuery>,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use photos_backend::domain::ports::{AddPhotoRequest, FixturePhotoRepository};
    use photos_backend::domain::{ImageUpload, UserId};
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn pool_present_selects_pool_backed_repository() {
        let repo = select_photo_repository(Some(()), |()| FixturePhotoRepository);
        // The fixture repository reports empty collections without storing.
        let user_id = UserId::random();
        let photos = repo
            .find_user_photos(&user_id)
            .await
            .expect("lookup succeeds")
            .expect("fixture knows every user");
        assert!(photos.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn pool_absent_keeps_photos_in_memory() {
        let repo = select_photo_repository::<(), FixturePhotoRepository>(None, |()| {
            FixturePhotoRepository
        });
        let config = ServerConfig::new(
            actix_web::cookie::Key::generate(),
            false,
            actix_web::cookie::SameSite::Lax,
            ([127, 0, 0, 1], 0).into(),
        )
        .with_photo_repository(repo);
        let state = build_http_state(&config);

        let owner = UserId::random();
        let added = state
            .photos
            .add_photo(AddPhotoRequest {
                caller_id: owner.clone(),
                owner_id: owner.clone(),
                upload: ImageUpload::new(vec![1, 2, 3]).expect("non-empty"),
                description: None,
            })
            .await
            .expect("in-memory add succeeds");
        let listed = state
            .photos_query
            .list_photos(&owner)
            .await
            .expect("list succeeds");
        assert_eq!(listed, vec![added]);
    }

    #[rstest]
    fn missing_credentials_fall_back_when_allowed() {
        assert!(build_media_store(None, true).is_ok());
    }

    #[rstest]
    fn missing_credentials_fail_when_fixture_disallowed() {
        assert!(build_media_store(None, false).is_err());
    }

    #[rstest]
    fn credentials_build_cloudinary_store() {
        let config = CloudinaryConfig::new("demo", "1234", "secret").expect("config");
        assert!(build_media_store(Some(config), false).is_ok());
    }
}
