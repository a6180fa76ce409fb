use crate::keys::validate_storage_key;
use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use audiodrop_core::StoredObject;
use bytes::Bytes;
use chrono::Utc;
use futures::TryStreamExt;
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStoreExt, PutPayload, Result as ObjectResult};
use std::sync::Arc;

/// Bucket backed by an `object_store` implementation (S3 or in-memory).
///
/// Constructed through [`ObjectStorage::s3`] or [`ObjectStorage::in_memory`].
#[derive(Clone)]
pub struct ObjectStorage {
    store: Arc<dyn object_store::ObjectStore>,
    bucket: String,
    url_base: String,
    backend: StorageBackend,
}

impl ObjectStorage {
    pub(crate) fn from_parts(
        store: Arc<dyn object_store::ObjectStore>,
        bucket: String,
        url_base: String,
        backend: StorageBackend,
    ) -> Self {
        Self {
            store,
            bucket,
            url_base: url_base.trim_end_matches('/').to_string(),
            backend,
        }
    }

    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.url_base, key)
    }
}

#[async_trait]
impl Storage for ObjectStorage {
    async fn upload_with_key(
        &self,
        storage_key: &str,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<StoredObject> {
        validate_storage_key(storage_key)?;
        let size = data.len() as u64;
        let location = Path::from(storage_key);
        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self.store.put(&location, PutPayload::from(data)).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %storage_key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Object upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            backend = %self.backend,
            bucket = %self.bucket,
            key = %storage_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object upload successful"
        );

        Ok(StoredObject {
            key: storage_key.to_string(),
            bucket: self.bucket.clone(),
            size_bytes: size,
            content_type: content_type.to_string(),
            url: self.generate_url(storage_key),
            created_at: Utc::now(),
        })
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Bytes> {
        validate_storage_key(storage_key)?;
        let location = Path::from(storage_key);

        let result: ObjectResult<_> = self.store.get(&location).await;

        let result = result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(storage_key.to_string()),
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %self.bucket,
                    key = %storage_key,
                    "Object download failed"
                );
                StorageError::DownloadFailed(other.to_string())
            }
        })?;

        result
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        validate_storage_key(storage_key)?;
        let location = Path::from(storage_key);

        match self.store.delete(&location).await {
            Ok(()) | Err(ObjectStoreError::NotFound { .. }) => {
                tracing::debug!(bucket = %self.bucket, key = %storage_key, "Object deleted");
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %storage_key,
                    "Object delete failed"
                );
                Err(StorageError::DeleteFailed(e.to_string()))
            }
        }
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        validate_storage_key(storage_key)?;
        let location = Path::from(storage_key);
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    async fn list_keys(&self) -> StorageResult<Vec<String>> {
        object_store::ObjectStore::list(self.store.as_ref(), None)
            .map_ok(|meta| meta.location.to_string())
            .try_collect::<Vec<String>>()
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn backend_type(&self) -> StorageBackend {
        self.backend
    }
}
