//! Photo HTTP handlers.
//!
//! ```text
//! GET    /api/v1/users/{userId}/photos
//! GET    /api/v1/users/{userId}/photos/main
//! GET    /api/v1/users/{userId}/photos/{id}
//! POST   /api/v1/users/{userId}/photos            multipart: file, description
//! POST   /api/v1/users/{userId}/photos/{id}/setMain
//! DELETE /api/v1/users/{userId}/photos/{id}
//! ```
//!
//! Every route needs an authenticated [`Caller`]. Mutations pass both the
//! path user and the caller to the photo service, which owns the ownership
//! decision.

use actix_easy_multipart::{MultipartForm, tempfile::Tempfile, text::Text};
use actix_web::http::header;
use actix_web::{HttpResponse, delete, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{AddPhotoRequest, DeletePhotoRequest, SetMainPhotoRequest};
use crate::domain::{Error, ImageUpload, Photo, PhotoId, UserId, photo_access};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::Caller;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, empty_upload_error, missing_field_error, parse_photo_id, parse_user_id,
};

const USER_ID_FIELD: FieldName = FieldName::new("userId");
const PHOTO_ID_FIELD: FieldName = FieldName::new("id");
const FILE_FIELD: FieldName = FieldName::new("file");

/// Photo representation returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PhotoResponse {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uri")]
    pub url: String,
    pub description: String,
    #[schema(value_type = String, format = "date-time")]
    pub date_added: DateTime<Utc>,
    pub is_main: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_id: Option<String>,
}

impl From<Photo> for PhotoResponse {
    fn from(photo: Photo) -> Self {
        Self {
            id: photo.id().to_string(),
            url: photo.url().to_string(),
            description: photo.description().to_owned(),
            date_added: photo.date_added(),
            is_main: photo.is_main(),
            public_id: photo.public_id().map(|id| id.as_str().to_owned()),
        }
    }
}

/// Multipart body accepted by [`add_photo`].
#[derive(MultipartForm)]
pub struct PhotoUploadForm {
    pub file: Option<Tempfile>,
    pub description: Option<Text<String>>,
}

/// OpenAPI description of [`PhotoUploadForm`].
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PhotoUploadSchema {
    /// Image file to upload.
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
    /// Optional caption, at most 500 characters.
    description: Option<String>,
}

fn parse_photo_path(path: (String, String)) -> Result<(UserId, PhotoId), Error> {
    let (user_id, photo_id) = path;
    Ok((
        parse_user_id(&user_id, USER_ID_FIELD)?,
        parse_photo_id(&photo_id, PHOTO_ID_FIELD)?,
    ))
}

async fn read_upload(file: Option<Tempfile>) -> Result<ImageUpload, Error> {
    let file = file.ok_or_else(|| missing_field_error(FILE_FIELD))?;
    let bytes = tokio::fs::read(file.file.path())
        .await
        .map_err(|error| Error::internal(format!("failed to read uploaded file: {error}")))?;
    let mut upload = ImageUpload::new(bytes).map_err(|_| empty_upload_error(FILE_FIELD))?;
    if let Some(file_name) = file.file_name {
        upload = upload.with_file_name(file_name);
    }
    if let Some(content_type) = file.content_type {
        upload = upload.with_content_type(content_type.to_string());
    }
    Ok(upload)
}

/// List every photo of a user, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/users/{userId}/photos",
    params(("userId" = uuid::Uuid, Path, description = "Photo owner")),
    responses(
        (status = 200, description = "Photos", body = [PhotoResponse]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Unknown user", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["photos"],
    operation_id = "listPhotos",
    security(("SessionCookie" = []))
)]
#[get("/users/{user_id}/photos")]
pub async fn list_photos(
    state: web::Data<HttpState>,
    _caller: Caller,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<PhotoResponse>>> {
    let user_id = parse_user_id(&path.into_inner(), USER_ID_FIELD)?;
    let photos = state.photos_query.list_photos(&user_id).await?;
    Ok(web::Json(
        photos.into_iter().map(PhotoResponse::from).collect(),
    ))
}

/// Fetch a user's main photo.
#[utoipa::path(
    get,
    path = "/api/v1/users/{userId}/photos/main",
    params(("userId" = uuid::Uuid, Path, description = "Photo owner")),
    responses(
        (status = 200, description = "Main photo", body = PhotoResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "No main photo", body = ErrorSchema)
    ),
    tags = ["photos"],
    operation_id = "getMainPhoto",
    security(("SessionCookie" = []))
)]
#[get("/users/{user_id}/photos/main")]
pub async fn get_main_photo(
    state: web::Data<HttpState>,
    _caller: Caller,
    path: web::Path<String>,
) -> ApiResult<web::Json<PhotoResponse>> {
    let user_id = parse_user_id(&path.into_inner(), USER_ID_FIELD)?;
    let photo = state.photos_query.main_photo(&user_id).await?;
    Ok(web::Json(PhotoResponse::from(photo)))
}

/// Fetch one photo of a user.
///
/// A photo that exists but belongs to someone else is reported as missing.
#[utoipa::path(
    get,
    path = "/api/v1/users/{userId}/photos/{id}",
    params(
        ("userId" = uuid::Uuid, Path, description = "Photo owner"),
        ("id" = uuid::Uuid, Path, description = "Photo id")
    ),
    responses(
        (status = 200, description = "Photo", body = PhotoResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Photo not found", body = ErrorSchema)
    ),
    tags = ["photos"],
    operation_id = "getPhoto",
    security(("SessionCookie" = []))
)]
#[get("/users/{user_id}/photos/{id}")]
pub async fn get_photo(
    state: web::Data<HttpState>,
    _caller: Caller,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<PhotoResponse>> {
    let (user_id, photo_id) = parse_photo_path(path.into_inner())?;
    let photo = state.photos_query.get_photo(&photo_id).await?;
    if photo.user_id() != &user_id {
        return Err(Error::not_found(format!("photo {photo_id} not found")));
    }
    Ok(web::Json(PhotoResponse::from(photo)))
}

/// Upload a photo into the caller's collection.
///
/// The first photo of a user becomes their main photo.
#[utoipa::path(
    post,
    path = "/api/v1/users/{userId}/photos",
    params(("userId" = uuid::Uuid, Path, description = "Photo owner")),
    request_body(content = PhotoUploadSchema, content_type = "multipart/form-data"),
    responses(
        (
            status = 201,
            description = "Photo stored",
            body = PhotoResponse,
            headers(("Location" = String, description = "URL of the new photo"))
        ),
        (status = 400, description = "Invalid request or not persisted", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Unknown user", body = ErrorSchema),
        (status = 409, description = "Concurrent change", body = ErrorSchema),
        (status = 502, description = "Media store failure", body = ErrorSchema)
    ),
    tags = ["photos"],
    operation_id = "addPhoto",
    security(("SessionCookie" = []))
)]
#[post("/users/{user_id}/photos")]
pub async fn add_photo(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
    form: MultipartForm<PhotoUploadForm>,
) -> ApiResult<HttpResponse> {
    let caller_id = caller.into_inner();
    let owner_id = parse_user_id(&path.into_inner(), USER_ID_FIELD)?;
    photo_access::authorize_owner(&caller_id, &owner_id)?;

    let form = form.0;
    let upload = read_upload(form.file).await?;
    let photo = state
        .photos
        .add_photo(AddPhotoRequest {
            owner_id: owner_id.clone(),
            caller_id,
            upload,
            description: form.description.map(|text| text.0),
        })
        .await?;

    let location = format!("/api/v1/users/{owner_id}/photos/{}", photo.id());
    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, location))
        .json(PhotoResponse::from(photo)))
}

/// Make a photo the caller's main photo.
#[utoipa::path(
    post,
    path = "/api/v1/users/{userId}/photos/{id}/setMain",
    params(
        ("userId" = uuid::Uuid, Path, description = "Photo owner"),
        ("id" = uuid::Uuid, Path, description = "Photo id")
    ),
    responses(
        (status = 204, description = "Main photo changed"),
        (status = 400, description = "Already main or not persisted", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Unknown user", body = ErrorSchema),
        (status = 409, description = "Concurrent change", body = ErrorSchema)
    ),
    tags = ["photos"],
    operation_id = "setMainPhoto",
    security(("SessionCookie" = []))
)]
#[post("/users/{user_id}/photos/{id}/setMain")]
pub async fn set_main_photo(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let caller_id = caller.into_inner();
    let (owner_id, photo_id) = parse_photo_path(path.into_inner())?;
    state
        .photos
        .set_main_photo(SetMainPhotoRequest {
            owner_id,
            caller_id,
            photo_id,
        })
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Delete a non-main photo.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{userId}/photos/{id}",
    params(
        ("userId" = uuid::Uuid, Path, description = "Photo owner"),
        ("id" = uuid::Uuid, Path, description = "Photo id")
    ),
    responses(
        (status = 200, description = "Photo deleted"),
        (status = 400, description = "Main photo or not persisted", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Unknown user", body = ErrorSchema),
        (status = 502, description = "Media store did not confirm deletion", body = ErrorSchema)
    ),
    tags = ["photos"],
    operation_id = "deletePhoto",
    security(("SessionCookie" = []))
)]
#[delete("/users/{user_id}/photos/{id}")]
pub async fn delete_photo(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let caller_id = caller.into_inner();
    let (owner_id, photo_id) = parse_photo_path(path.into_inner())?;
    state
        .photos
        .delete_photo(DeletePhotoRequest {
            owner_id,
            caller_id,
            photo_id,
        })
        .await?;
    Ok(HttpResponse::Ok().finish())
}

/// Register the photo routes. `get_main_photo` precedes `get_photo` so the
/// literal `main` segment is not parsed as a photo id.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_photos)
        .service(get_main_photo)
        .service(get_photo)
        .service(add_photo)
        .service(set_main_photo)
        .service(delete_photo);
}
