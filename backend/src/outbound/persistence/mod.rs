//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repository implementations only translate between Diesel rows and domain
//! types. Row structs (`models.rs`) and table definitions (`schema.rs`) stay
//! private to this module. Connections come from a `bb8` pool through
//! `diesel-async`, and every database error is mapped onto the port's error
//! type.

mod diesel_basic_error_mapping;
mod diesel_photo_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_photo_repository::DieselPhotoRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
