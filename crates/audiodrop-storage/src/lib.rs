//! Audiodrop Storage Library
//!
//! Storage abstraction for uploaded audio and its backends: S3 (through
//! `object_store`), the local filesystem, and an in-process memory store.
//!
//! # Storage key format
//!
//! Uploads are written under `uploads/{uuid}-{filename}`, so two submissions of
//! the same file never overwrite each other. Keys must not contain `..` or a
//! leading `/`. Key generation is centralized in the `keys` module.
//!
//! # Atomicity
//!
//! Every backend makes a write visible only once it is complete: object stores
//! commit a `PUT` atomically, and the local backend writes to a temporary file
//! that is renamed into place.

pub mod factory;
pub(crate) mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod memory;
pub mod object;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use audiodrop_core::StorageBackend;
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use object::ObjectStorage;
pub use traits::{Storage, StorageError, StorageResult};
