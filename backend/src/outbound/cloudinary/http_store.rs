//! Reqwest-backed Cloudinary media store.
//!
//! This adapter owns transport details only: request signing, multipart
//! serialisation, timeout and HTTP error mapping, and JSON decoding into
//! domain values.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;
use zeroize::Zeroizing;

use super::dto::{DestroyResponseDto, UploadResponseDto};
use super::signature::{SignatureAlgorithm, sign};
use crate::domain::ports::{DeletionOutcome, MediaStore, MediaStoreError};
use crate::domain::{CropMode, Gravity, ImageTransform, ImageUpload, PublicId, UploadedImage};

const DEFAULT_API_BASE: &str = "https://api.cloudinary.com";
const DEFAULT_FILE_NAME: &str = "upload";

/// Account credentials and endpoint for the Cloudinary API.
#[derive(Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: Zeroizing<String>,
    pub api_base: Url,
    pub timeout: Duration,
    pub signature_algorithm: SignatureAlgorithm,
}

impl CloudinaryConfig {
    /// Configuration against the public API with a 30 second timeout and
    /// SHA-1 request signatures.
    ///
    /// # Errors
    ///
    /// Returns an error when the built-in API base fails to parse.
    pub fn new(
        cloud_name: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Result<Self, url::ParseError> {
        Ok(Self {
            cloud_name: cloud_name.into(),
            api_key: api_key.into(),
            api_secret: Zeroizing::new(api_secret.into()),
            api_base: Url::parse(DEFAULT_API_BASE)?,
            timeout: Duration::from_secs(30),
            signature_algorithm: SignatureAlgorithm::default(),
        })
    }
}

// The secret never reaches logs.
impl fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("api_base", &self.api_base.as_str())
            .field("timeout", &self.timeout)
            .field("signature_algorithm", &self.signature_algorithm)
            .finish()
    }
}

/// Media store adapter for one Cloudinary account.
pub struct CloudinaryMediaStore {
    client: Client,
    upload_endpoint: Url,
    destroy_endpoint: Url,
    api_key: String,
    api_secret: Zeroizing<String>,
    signature_algorithm: SignatureAlgorithm,
    clock: Arc<dyn Clock>,
}

impl CloudinaryMediaStore {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    /// Request timestamps are read from `clock`.
    ///
    /// # Errors
    ///
    /// Returns [`MediaStoreError::Transport`] when the reqwest client cannot
    /// be constructed or the endpoints cannot be derived from the API base.
    pub fn new(config: CloudinaryConfig, clock: Arc<dyn Clock>) -> Result<Self, MediaStoreError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| MediaStoreError::transport(err.to_string()))?;
        let upload_endpoint = endpoint(&config.api_base, &config.cloud_name, "upload")?;
        let destroy_endpoint = endpoint(&config.api_base, &config.cloud_name, "destroy")?;
        Ok(Self {
            client,
            upload_endpoint,
            destroy_endpoint,
            api_key: config.api_key,
            api_secret: config.api_secret,
            signature_algorithm: config.signature_algorithm,
            clock,
        })
    }

    fn timestamp(&self) -> String {
        self.clock.utc().timestamp().to_string()
    }

    /// Text fields sent alongside the uploaded file.
    fn upload_fields(&self, transform: &ImageTransform) -> Vec<(&'static str, String)> {
        let timestamp = self.timestamp();
        let transformation = transformation(transform);
        let signature = sign(
            &[
                ("timestamp", timestamp.as_str()),
                ("transformation", transformation.as_str()),
            ],
            &self.api_secret,
            self.signature_algorithm,
        );
        vec![
            ("api_key", self.api_key.clone()),
            ("timestamp", timestamp),
            ("transformation", transformation),
            ("signature", signature),
        ]
    }

    /// Form fields for a destroy request.
    fn destroy_fields(&self, public_id: &PublicId) -> Vec<(&'static str, String)> {
        let timestamp = self.timestamp();
        let signature = sign(
            &[
                ("public_id", public_id.as_str()),
                ("timestamp", timestamp.as_str()),
            ],
            &self.api_secret,
            self.signature_algorithm,
        );
        vec![
            ("public_id", public_id.as_str().to_owned()),
            ("api_key", self.api_key.clone()),
            ("timestamp", timestamp),
            ("signature", signature),
        ]
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, MediaStoreError> {
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        serde_json::from_slice(body.as_ref()).map_err(|error| {
            MediaStoreError::decode(format!("invalid Cloudinary JSON payload: {error}"))
        })
    }
}

fn endpoint(api_base: &Url, cloud_name: &str, action: &str) -> Result<Url, MediaStoreError> {
    let path = format!(
        "{}/v1_1/{cloud_name}/image/{action}",
        api_base.path().trim_end_matches('/')
    );
    let mut url = api_base.clone();
    url.set_path(&path);
    if url.cannot_be_a_base() {
        return Err(MediaStoreError::transport(format!(
            "Cloudinary API base {api_base} cannot carry a path"
        )));
    }
    Ok(url)
}

/// Render a transform as a Cloudinary transformation string.
fn transformation(transform: &ImageTransform) -> String {
    let crop = match transform.crop {
        CropMode::Thumb => "thumb",
    };
    let gravity = match transform.gravity {
        Gravity::Face => "face",
    };
    format!(
        "c_{crop},g_{gravity},h_{},w_{}",
        transform.height, transform.width
    )
}

fn file_part(image: &ImageUpload) -> Result<Part, MediaStoreError> {
    let part = Part::bytes(image.bytes().to_vec())
        .file_name(image.file_name().unwrap_or(DEFAULT_FILE_NAME).to_owned());
    match image.content_type() {
        Some(content_type) => part
            .mime_str(content_type)
            .map_err(|err| MediaStoreError::rejected(format!("invalid content type: {err}"))),
        None => Ok(part),
    }
}

#[async_trait]
impl MediaStore for CloudinaryMediaStore {
    async fn upload(
        &self,
        image: &ImageUpload,
        transform: &ImageTransform,
    ) -> Result<UploadedImage, MediaStoreError> {
        let form = self
            .upload_fields(transform)
            .into_iter()
            .fold(Form::new().part("file", file_part(image)?), |form, (name, value)| {
                form.text(name, value)
            });

        debug!(bytes = image.len(), "uploading image to Cloudinary");
        let decoded: UploadResponseDto = self
            .send(
                self.client
                    .post(self.upload_endpoint.clone())
                    .header(reqwest::header::ACCEPT, "application/json")
                    .multipart(form),
            )
            .await?;
        decoded
            .into_uploaded_image()
            .map_err(MediaStoreError::decode)
    }

    async fn destroy(&self, public_id: &PublicId) -> Result<DeletionOutcome, MediaStoreError> {
        let fields = self.destroy_fields(public_id);

        debug!(%public_id, "deleting image from Cloudinary");
        let decoded: DestroyResponseDto = self
            .send(
                self.client
                    .post(self.destroy_endpoint.clone())
                    .header(reqwest::header::ACCEPT, "application/json")
                    .form(&fields),
            )
            .await?;
        Ok(decoded.into_outcome())
    }
}

fn map_transport_error(error: reqwest::Error) -> MediaStoreError {
    if error.is_timeout() {
        MediaStoreError::timeout(error.to_string())
    } else {
        MediaStoreError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> MediaStoreError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            MediaStoreError::timeout(message)
        }
        _ if status.is_client_error() => MediaStoreError::rejected(message),
        _ => MediaStoreError::transport(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
