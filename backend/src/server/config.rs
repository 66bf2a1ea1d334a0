//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::cookie::{Key, SameSite};
use photos_backend::domain::ports::{FixtureMediaStore, MediaStore, PhotoRepository};
use photos_backend::outbound::memory::InMemoryPhotoRepository;

const DEFAULT_UPLOAD_LIMIT_BYTES: usize = 10 * 1024 * 1024;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) upload_limit_bytes: usize,
    pub(crate) photo_repo: Arc<dyn PhotoRepository>,
    pub(crate) media_store: Arc<dyn MediaStore>,
}

impl ServerConfig {
    /// Construct a server configuration backed by the in-memory repository
    /// and the fixture media store.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            upload_limit_bytes: DEFAULT_UPLOAD_LIMIT_BYTES,
            photo_repo: Arc::new(InMemoryPhotoRepository::new()),
            media_store: Arc::new(FixtureMediaStore),
        }
    }

    /// Use `photo_repo` for photo persistence.
    #[must_use]
    pub fn with_photo_repository(mut self, photo_repo: Arc<dyn PhotoRepository>) -> Self {
        self.photo_repo = photo_repo;
        self
    }

    /// Use `media_store` for image hosting.
    #[must_use]
    pub fn with_media_store(mut self, media_store: Arc<dyn MediaStore>) -> Self {
        self.media_store = media_store;
        self
    }

    /// Cap the size of multipart uploads.
    #[must_use]
    pub fn with_upload_limit(mut self, upload_limit_bytes: usize) -> Self {
        self.upload_limit_bytes = upload_limit_bytes;
        self
    }

    /// Return the socket address the server will bind to.
    #[cfg_attr(
        not(any(test, doctest)),
        expect(dead_code, reason = "Exercised by server tests")
    )]
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
