//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: the photo endpoints and the health probes
//! - **Schemas**: photo payloads plus wrappers ([`ErrorSchema`],
//!   [`ErrorCodeSchema`]) that describe domain errors without coupling them
//!   to utoipa
//! - **Security**: session cookie authentication scheme
//!
//! The generated specification is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::photos::{PhotoResponse, PhotoUploadSchema};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Signed session cookie carrying the authenticated user id.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Photo service API",
        description = "Upload, list, promote and delete user profile photos.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::photos::list_photos,
        crate::inbound::http::photos::get_main_photo,
        crate::inbound::http::photos::get_photo,
        crate::inbound::http::photos::add_photo,
        crate::inbound::http::photos::set_main_photo,
        crate::inbound::http::photos::delete_photo,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(PhotoResponse, PhotoUploadSchema, ErrorSchema, ErrorCodeSchema)),
    tags(
        (name = "photos", description = "Operations on a user's photo collection"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
