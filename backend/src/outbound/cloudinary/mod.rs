//! Cloudinary outbound adapter.
//!
//! This module provides a signed HTTP implementation of the `MediaStore`
//! port.

mod dto;
mod http_store;
mod signature;

pub use http_store::{CloudinaryConfig, CloudinaryMediaStore};
pub use signature::{SignatureAlgorithm, UnknownSignatureAlgorithm};
