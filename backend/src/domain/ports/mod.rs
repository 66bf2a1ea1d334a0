//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports ([`PhotoRepository`], [`MediaStore`]) describe what the domain
//! needs from adapters. Driving ports ([`PhotoCommand`], [`PhotoQuery`]) are
//! what inbound adapters call.

mod macros;
pub(crate) use macros::define_port_error;

mod media_store;
mod photo_command;
mod photo_query;
mod photo_repository;

#[cfg(test)]
pub use media_store::MockMediaStore;
pub use media_store::{DeletionOutcome, FixtureMediaStore, MediaStore, MediaStoreError};
#[cfg(test)]
pub use photo_command::MockPhotoCommand;
pub use photo_command::{AddPhotoRequest, DeletePhotoRequest, PhotoCommand, SetMainPhotoRequest};
#[cfg(test)]
pub use photo_query::MockPhotoQuery;
pub use photo_query::PhotoQuery;
#[cfg(test)]
pub use photo_repository::MockPhotoRepository;
pub use photo_repository::{FixturePhotoRepository, PhotoRepository, PhotoRepositoryError};
