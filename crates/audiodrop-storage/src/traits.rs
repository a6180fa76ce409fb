//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use audiodrop_core::StoredObject;
use bytes::Bytes;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// A `Storage` is one bucket. The ingestion endpoint writes through it and the
/// provisioning engine empties it on teardown. Writes must be atomic: readers
/// either see the complete object or nothing.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write `data` under an explicit key.
    async fn upload_with_key(
        &self,
        storage_key: &str,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<StoredObject>;

    /// Read a whole object.
    async fn download(&self, storage_key: &str) -> StorageResult<Bytes>;

    /// Delete an object. Deleting a missing key is not an error.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Check if an object exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Keys of every object currently in the bucket.
    async fn list_keys(&self) -> StorageResult<Vec<String>>;

    /// Name of the bucket this storage writes into
    fn bucket(&self) -> &str;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;

    /// Write `data` under a freshly generated `uploads/{uuid}-{filename}` key.
    async fn upload(
        &self,
        filename: &str,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<StoredObject> {
        let key = crate::keys::generate_storage_key(filename);
        self.upload_with_key(&key, content_type, data).await
    }

    /// Delete every object in the bucket, returning how many were removed.
    async fn empty(&self) -> StorageResult<usize> {
        let keys = self.list_keys().await?;
        for key in &keys {
            self.delete(key).await?;
        }
        tracing::info!(
            bucket = %self.bucket(),
            objects_deleted = keys.len(),
            "Bucket emptied"
        );
        Ok(keys.len())
    }
}
