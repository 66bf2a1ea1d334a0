//! Backend entry-point: loads settings, wires adapters and serves the photo API.

mod server;

use std::path::Path;

use actix_web::cookie::{Key, SameSite};
use actix_web::web;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use photos_backend::inbound::http::health::HealthState;
use photos_backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use photos_backend::settings::{MediaStoreSettings, ServerSettings};
use server::{ServerConfig, build_media_store, build_photo_repository, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::from_env()
        .map_err(|e| std::io::Error::other(format!("invalid server settings: {e}")))?;
    let media_settings = MediaStoreSettings::from_env()
        .map_err(|e| std::io::Error::other(format!("invalid media store settings: {e}")))?;

    let key = load_session_key(&settings.session_key_file(), settings.session_allow_ephemeral)?;
    let pool = connect_database(&settings).await?;

    let cloudinary = media_settings
        .cloudinary_config()
        .map_err(std::io::Error::other)?;
    let media_store = build_media_store(cloudinary, cfg!(debug_assertions))?;

    let config = ServerConfig::new(key, settings.cookie_secure, SameSite::Lax, settings.bind_addr())
        .with_photo_repository(build_photo_repository(pool))
        .with_media_store(media_store)
        .with_upload_limit(settings.upload_limit_bytes());

    info!(bind_addr = %settings.bind_addr(), "starting photo service");
    let health_state = web::Data::new(HealthState::new());
    create_server(health_state, config)?.await
}

fn load_session_key(path: &Path, allow_ephemeral: bool) -> std::io::Result<Key> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(e) => {
            if cfg!(debug_assertions) || allow_ephemeral {
                warn!(path = %path.display(), error = %e, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read session key at {}: {e}",
                    path.display()
                )))
            }
        }
    }
}

async fn connect_database(settings: &ServerSettings) -> std::io::Result<Option<DbPool>> {
    let Some(database_url) = settings.database_url.as_deref() else {
        return Ok(None);
    };
    run_pending_migrations(database_url)
        .await
        .map_err(std::io::Error::other)?;
    let config = PoolConfig::new(database_url).with_max_size(settings.database_pool_size());
    let pool = DbPool::new(config)
        .await
        .map_err(std::io::Error::other)?;
    Ok(Some(pool))
}

#[cfg(test)]
mod tests;
