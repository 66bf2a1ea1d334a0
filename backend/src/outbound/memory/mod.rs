//! In-process adapters used when no database is configured.

mod in_memory_photo_repository;

pub use in_memory_photo_repository::InMemoryPhotoRepository;
