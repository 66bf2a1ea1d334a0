//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed photo repository using Diesel ORM
//! - **memory**: mutex-guarded photo repository for local runs and tests
//! - **cloudinary**: media store backed by the Cloudinary upload API
//!
//! Adapters are thin translators between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod cloudinary;
pub mod memory;
pub mod persistence;
