//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{PhotoCommand, PhotoQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub photos: Arc<dyn PhotoCommand>,
    pub photos_query: Arc<dyn PhotoQuery>,
}

impl HttpState {
    /// Construct state from the photo driving ports.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use photos_backend::domain::PhotoService;
    /// use photos_backend::domain::ports::{FixtureMediaStore, FixturePhotoRepository};
    /// use photos_backend::inbound::http::state::HttpState;
    ///
    /// let service = Arc::new(PhotoService::new(
    ///     Arc::new(FixturePhotoRepository),
    ///     Arc::new(FixtureMediaStore),
    ///     Arc::new(DefaultClock),
    /// ));
    /// let state = HttpState::new(service.clone(), service);
    /// let _photos = state.photos.clone();
    /// ```
    pub fn new(photos: Arc<dyn PhotoCommand>, photos_query: Arc<dyn PhotoQuery>) -> Self {
        Self {
            photos,
            photos_query,
        }
    }

    /// Construct state from one value implementing both photo ports.
    pub fn from_service<S>(service: Arc<S>) -> Self
    where
        S: PhotoCommand + PhotoQuery + 'static,
    {
        Self {
            photos: service.clone(),
            photos_query: service,
        }
    }
}
