//! Runtime settings loaded via OrthoConfig.
//!
//! Values come from environment variables and configuration files. The
//! server reads [`ServerSettings`] (prefix `PHOTOS`) and the media store
//! reads [`MediaStoreSettings`] (prefix `CLOUDINARY`); each is loaded once in
//! `main` and passed explicitly to what needs it.

use std::ffi::OsString;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::outbound::cloudinary::{CloudinaryConfig, UnknownSignatureAlgorithm};

const DEFAULT_BIND_ADDR: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 8080));
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";
const DEFAULT_UPLOAD_LIMIT_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_MEDIA_TIMEOUT_SECS: u64 = 30;
const DEFAULT_POOL_SIZE: u32 = 10;

/// HTTP server, session and storage settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PHOTOS")]
pub struct ServerSettings {
    /// Socket address the server binds to.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL URL. Without it photos are kept in memory.
    pub database_url: Option<String>,
    /// Maximum number of pooled database connections.
    pub database_pool_size: Option<u32>,
    /// File holding the session signing key material.
    pub session_key_file: Option<PathBuf>,
    /// Allow a generated session key when the key file is unreadable.
    #[ortho_config(default = false)]
    pub session_allow_ephemeral: bool,
    /// Mark the session cookie `Secure`.
    #[ortho_config(default = true)]
    pub cookie_secure: bool,
    /// Largest accepted multipart upload in bytes.
    pub upload_limit_bytes: Option<usize>,
}

impl ServerSettings {
    /// Load settings from the environment and configuration files.
    ///
    /// # Errors
    ///
    /// Returns the OrthoConfig error when a value fails to parse.
    pub fn from_env() -> ortho_config::OrthoResult<Self> {
        Self::load_from_iter([OsString::from("photos-backend")])
    }

    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr.unwrap_or(DEFAULT_BIND_ADDR)
    }

    pub fn database_pool_size(&self) -> u32 {
        self.database_pool_size.unwrap_or(DEFAULT_POOL_SIZE)
    }

    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE))
    }

    pub fn upload_limit_bytes(&self) -> usize {
        self.upload_limit_bytes.unwrap_or(DEFAULT_UPLOAD_LIMIT_BYTES)
    }
}

/// Raised when media store settings are present but unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MediaStoreSettingsError {
    #[error("CLOUDINARY_{field} must be set alongside the other Cloudinary credentials")]
    Incomplete { field: &'static str },
    #[error("CLOUDINARY_API_BASE is not a valid URL: {message}")]
    InvalidApiBase { message: String },
    #[error("CLOUDINARY_SIGNATURE_ALGORITHM: {source}")]
    InvalidSignatureAlgorithm {
        #[source]
        source: UnknownSignatureAlgorithm,
    },
}

/// Credentials and endpoint for the Cloudinary media store.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CLOUDINARY")]
pub struct MediaStoreSettings {
    pub cloud_name: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    /// Override for the Cloudinary API base URL.
    pub api_base: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// `sha1` (default) or `sha256`, matching the account's signing setting.
    pub signature_algorithm: Option<String>,
}

// The secret never reaches logs.
impl std::fmt::Debug for MediaStoreSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaStoreSettings")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &self.api_secret.as_ref().map(|_| "<redacted>"))
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .field("signature_algorithm", &self.signature_algorithm)
            .finish()
    }
}

impl MediaStoreSettings {
    /// Load settings from the environment and configuration files.
    ///
    /// # Errors
    ///
    /// Returns the OrthoConfig error when a value fails to parse.
    pub fn from_env() -> ortho_config::OrthoResult<Self> {
        Self::load_from_iter([OsString::from("photos-backend")])
    }

    /// Build the adapter configuration.
    ///
    /// Returns `Ok(None)` when no credential is configured at all.
    ///
    /// # Errors
    ///
    /// Returns [`MediaStoreSettingsError`] when only some credentials are set
    /// or the API base or signature algorithm does not parse.
    pub fn cloudinary_config(&self) -> Result<Option<CloudinaryConfig>, MediaStoreSettingsError> {
        let (cloud_name, api_key, api_secret) =
            match (&self.cloud_name, &self.api_key, &self.api_secret) {
                (None, None, None) => return Ok(None),
                (Some(cloud_name), Some(api_key), Some(api_secret)) => {
                    (cloud_name, api_key, api_secret)
                }
                (None, _, _) => {
                    return Err(MediaStoreSettingsError::Incomplete {
                        field: "CLOUD_NAME",
                    });
                }
                (_, None, _) => return Err(MediaStoreSettingsError::Incomplete { field: "API_KEY" }),
                (_, _, None) => {
                    return Err(MediaStoreSettingsError::Incomplete {
                        field: "API_SECRET",
                    });
                }
            };

        let mut config =
            CloudinaryConfig::new(cloud_name.clone(), api_key.clone(), api_secret.clone())
                .map_err(|err| MediaStoreSettingsError::InvalidApiBase {
                    message: err.to_string(),
                })?;
        if let Some(api_base) = &self.api_base {
            config.api_base =
                Url::parse(api_base).map_err(|err| MediaStoreSettingsError::InvalidApiBase {
                    message: err.to_string(),
                })?;
        }
        config.timeout =
            Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_MEDIA_TIMEOUT_SECS));
        if let Some(algorithm) = &self.signature_algorithm {
            config.signature_algorithm = algorithm
                .parse()
                .map_err(|source| MediaStoreSettingsError::InvalidSignatureAlgorithm { source })?;
        }
        Ok(Some(config))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;

    use crate::outbound::cloudinary::SignatureAlgorithm;
    use env_lock::lock_env;
    use rstest::rstest;

    const SERVER_VARS: [&str; 7] = [
        "PHOTOS_BIND_ADDR",
        "PHOTOS_DATABASE_URL",
        "PHOTOS_DATABASE_POOL_SIZE",
        "PHOTOS_SESSION_KEY_FILE",
        "PHOTOS_SESSION_ALLOW_EPHEMERAL",
        "PHOTOS_COOKIE_SECURE",
        "PHOTOS_UPLOAD_LIMIT_BYTES",
    ];

    fn cleared(names: &[&'static str]) -> Vec<(&'static str, Option<String>)> {
        names.iter().map(|name| (*name, None)).collect()
    }

    fn media(
        cloud_name: Option<&str>,
        api_key: Option<&str>,
        api_secret: Option<&str>,
    ) -> MediaStoreSettings {
        MediaStoreSettings {
            cloud_name: cloud_name.map(str::to_owned),
            api_key: api_key.map(str::to_owned),
            api_secret: api_secret.map(str::to_owned),
            api_base: None,
            timeout_secs: None,
            signature_algorithm: None,
        }
    }

    #[rstest]
    fn server_defaults_are_used_when_missing() {
        let _guard = lock_env(cleared(&SERVER_VARS));

        let settings = ServerSettings::from_env().expect("config should load");
        assert_eq!(settings.bind_addr(), SocketAddr::from(([0, 0, 0, 0], 8080)));
        assert!(settings.database_url.is_none());
        assert_eq!(settings.database_pool_size(), DEFAULT_POOL_SIZE);
        assert_eq!(
            settings.session_key_file(),
            PathBuf::from(DEFAULT_SESSION_KEY_FILE)
        );
        assert!(!settings.session_allow_ephemeral);
        assert!(settings.cookie_secure);
        assert_eq!(settings.upload_limit_bytes(), DEFAULT_UPLOAD_LIMIT_BYTES);
    }

    #[rstest]
    fn server_environment_overrides_are_respected() {
        let mut vars = cleared(&SERVER_VARS);
        vars.extend([
            ("PHOTOS_BIND_ADDR", Some("127.0.0.1:9090".to_owned())),
            (
                "PHOTOS_DATABASE_URL",
                Some("postgres://localhost/photos".to_owned()),
            ),
            ("PHOTOS_COOKIE_SECURE", Some("false".to_owned())),
            ("PHOTOS_UPLOAD_LIMIT_BYTES", Some("2048".to_owned())),
        ]);
        let _guard = lock_env(vars);

        let settings = ServerSettings::from_env().expect("config should load");
        assert_eq!(settings.bind_addr(), SocketAddr::from(([127, 0, 0, 1], 9090)));
        assert_eq!(
            settings.database_url.as_deref(),
            Some("postgres://localhost/photos")
        );
        assert!(!settings.cookie_secure);
        assert_eq!(settings.upload_limit_bytes(), 2048);
    }

    #[rstest]
    fn media_settings_load_from_environment() {
        let _guard = lock_env([
            ("CLOUDINARY_CLOUD_NAME", Some("demo".to_owned())),
            ("CLOUDINARY_API_KEY", Some("1234".to_owned())),
            ("CLOUDINARY_API_SECRET", Some("shh".to_owned())),
            ("CLOUDINARY_API_BASE", None),
            ("CLOUDINARY_TIMEOUT_SECS", Some("5".to_owned())),
            ("CLOUDINARY_SIGNATURE_ALGORITHM", Some("sha256".to_owned())),
        ]);

        let settings = MediaStoreSettings::from_env().expect("config should load");
        let config = settings
            .cloudinary_config()
            .expect("complete settings")
            .expect("credentials present");
        assert_eq!(config.cloud_name, "demo");
        assert_eq!(config.api_secret.as_str(), "shh");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.api_base.as_str(), "https://api.cloudinary.com/");
        assert_eq!(config.signature_algorithm, SignatureAlgorithm::Sha256);
    }

    #[rstest]
    fn signature_algorithm_defaults_to_sha1() {
        let config = media(Some("c"), Some("k"), Some("s"))
            .cloudinary_config()
            .expect("complete settings")
            .expect("credentials present");
        assert_eq!(config.signature_algorithm, SignatureAlgorithm::Sha1);
    }

    #[rstest]
    fn unknown_signature_algorithm_is_rejected() {
        let mut settings = media(Some("c"), Some("k"), Some("s"));
        settings.signature_algorithm = Some("md5".to_owned());
        assert!(matches!(
            settings.cloudinary_config(),
            Err(MediaStoreSettingsError::InvalidSignatureAlgorithm { .. })
        ));
    }

    #[rstest]
    fn absent_credentials_disable_the_media_store() {
        assert!(matches!(media(None, None, None).cloudinary_config(), Ok(None)));
    }

    #[rstest]
    #[case::no_cloud(media(None, Some("k"), Some("s")), "CLOUD_NAME")]
    #[case::no_key(media(Some("c"), None, Some("s")), "API_KEY")]
    #[case::no_secret(media(Some("c"), Some("k"), None), "API_SECRET")]
    fn partial_credentials_are_rejected(
        #[case] settings: MediaStoreSettings,
        #[case] expected: &'static str,
    ) {
        assert_eq!(
            settings.cloudinary_config().map(|config| config.is_some()),
            Err(MediaStoreSettingsError::Incomplete { field: expected })
        );
    }

    #[rstest]
    fn invalid_api_base_is_rejected() {
        let mut settings = media(Some("c"), Some("k"), Some("s"));
        settings.api_base = Some("not a url".to_owned());
        assert!(matches!(
            settings.cloudinary_config(),
            Err(MediaStoreSettingsError::InvalidApiBase { .. })
        ));
    }

    #[rstest]
    fn debug_output_redacts_secret() {
        let rendered = format!("{:?}", media(Some("c"), Some("k"), Some("hunter2")));
        assert!(!rendered.contains("hunter2"));
    }
}
