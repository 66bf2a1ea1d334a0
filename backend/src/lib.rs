//! Photo management backend.
//!
//! The domain layer owns the per-user photo collection and its main-photo
//! rules. Inbound HTTP adapters and outbound persistence and media-store
//! adapters plug into it through the ports in [`domain::ports`].

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(feature = "test-support")]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
