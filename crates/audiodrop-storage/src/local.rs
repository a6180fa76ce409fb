use crate::keys::validate_storage_key;
use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use audiodrop_core::StoredObject;
use bytes::Bytes;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Suffix of in-progress writes. Files carrying it are never listed.
const TEMP_SUFFIX: &str = ".partial";

/// Local filesystem storage implementation
///
/// The bucket is a directory; object keys map to relative paths beneath it.
#[derive(Clone)]
pub struct LocalStorage {
    bucket: String,
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `bucket` - Logical bucket name reported on stored objects
    /// * `base_path` - Root directory for file storage (e.g., "/var/lib/audiodrop/my-mp3-bucket")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:8080/media")
    pub async fn new(
        bucket: String,
        base_path: impl Into<PathBuf>,
        base_url: String,
    ) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        tracing::info!(
            bucket = %bucket,
            path = %base_path.display(),
            "Local storage configured"
        );

        Ok(LocalStorage {
            bucket,
            base_path,
            base_url,
        })
    }

    /// Convert storage key to filesystem path with security validation
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        validate_storage_key(storage_key)?;
        if storage_key.ends_with(TEMP_SUFFIX) {
            return Err(StorageError::InvalidKey(storage_key.to_string()));
        }

        let path = self.base_path.join(storage_key);
        if path.strip_prefix(&self.base_path).is_err() {
            return Err(StorageError::InvalidKey(
                "Storage key resolves outside storage directory".to_string(),
            ));
        }

        Ok(path)
    }

    /// Inverse of [`Self::key_to_path`] for paths found while walking the tree.
    fn path_to_key(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.base_path).ok()?;
        let segments: Option<Vec<&str>> = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect();
        Some(segments?.join("/"))
    }

    /// Generate public URL for file
    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    async fn write_temp(&self, temp_path: &Path, data: &[u8]) -> std::io::Result<()> {
        let mut file = fs::File::create(temp_path).await?;
        file.write_all(data).await?;
        file.sync_all().await
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload_with_key(
        &self,
        storage_key: &str,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<StoredObject> {
        let path = self.key_to_path(storage_key)?;
        let size = data.len() as u64;

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();
        let temp_path = PathBuf::from(format!(
            "{}.{}{}",
            path.display(),
            Uuid::new_v4().simple(),
            TEMP_SUFFIX
        ));

        if let Err(e) = self.write_temp(&temp_path, &data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(StorageError::UploadFailed(format!(
                "Failed to write file {}: {}",
                path.display(),
                e
            )));
        }

        // Rename is atomic within a filesystem: readers see the old state or the whole file.
        if let Err(e) = fs::rename(&temp_path, &path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(StorageError::UploadFailed(format!(
                "Failed to commit file {}: {}",
                path.display(),
                e
            )));
        }

        tracing::info!(
            bucket = %self.bucket,
            path = %path.display(),
            key = %storage_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
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
        let path = self.key_to_path(storage_key)?;

        match fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(storage_key.to_string()))
            }
            Err(e) => Err(StorageError::DownloadFailed(format!(
                "Failed to read file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let path = self.key_to_path(storage_key)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(bucket = %self.bucket, key = %storage_key, "Local file deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to delete file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(storage_key)?;
        Ok(fs::try_exists(&path).await?)
    }

    async fn list_keys(&self) -> StorageResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut pending = vec![self.base_path.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    pending.push(path);
                } else if file_type.is_file() {
                    let is_temp = path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.ends_with(TEMP_SUFFIX));
                    if is_temp {
                        continue;
                    }
                    if let Some(key) = self.path_to_key(&path) {
                        keys.push(key);
                    }
                }
            }
        }

        keys.sort();
        Ok(keys)
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn storage(dir: &TempDir) -> LocalStorage {
        LocalStorage::new(
            "my-mp3-bucket".to_string(),
            dir.path().join("my-mp3-bucket"),
            "http://localhost:8080/media/".to_string(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn upload_writes_file_under_key() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir).await;

        let object = storage
            .upload("track.mp3", "audio/mpeg", Bytes::from_static(b"ID3"))
            .await
            .unwrap();

        assert_eq!(object.bucket, "my-mp3-bucket");
        assert_eq!(object.content_type, "audio/mpeg");
        assert_eq!(
            object.url,
            format!("http://localhost:8080/media/{}", object.key)
        );
        let on_disk = std::fs::read(dir.path().join("my-mp3-bucket").join(&object.key)).unwrap();
        assert_eq!(on_disk, b"ID3");
    }

    #[tokio::test]
    async fn no_temporary_files_remain_after_upload() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir).await;
        storage
            .upload_with_key("uploads/a.mp3", "audio/mpeg", Bytes::from_static(b"a"))
            .await
            .unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path().join("my-mp3-bucket/uploads"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.mp3".to_string()]);
    }

    #[tokio::test]
    async fn list_skips_partial_writes() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir).await;
        storage
            .upload_with_key("uploads/a.mp3", "audio/mpeg", Bytes::from_static(b"a"))
            .await
            .unwrap();
        std::fs::write(
            dir.path().join("my-mp3-bucket/uploads/b.mp3.abc.partial"),
            b"half",
        )
        .unwrap();

        assert_eq!(storage.list_keys().await.unwrap(), vec!["uploads/a.mp3"]);
    }

    #[tokio::test]
    async fn download_and_delete() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir).await;
        storage
            .upload_with_key("uploads/a.mp3", "audio/mpeg", Bytes::from_static(b"a"))
            .await
            .unwrap();

        assert_eq!(storage.download("uploads/a.mp3").await.unwrap(), "a");
        storage.delete("uploads/a.mp3").await.unwrap();
        assert!(!storage.exists("uploads/a.mp3").await.unwrap());
        assert!(matches!(
            storage.download("uploads/a.mp3").await,
            Err(StorageError::NotFound(_))
        ));
        storage.delete("uploads/a.mp3").await.unwrap();
    }

    #[tokio::test]
    async fn empty_deletes_nested_objects() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir).await;
        for key in ["uploads/a.mp3", "uploads/deep/b.mp3", "c.mp3"] {
            storage
                .upload_with_key(key, "audio/mpeg", Bytes::from_static(b"x"))
                .await
                .unwrap();
        }

        assert_eq!(storage.empty().await.unwrap(), 3);
        assert!(storage.list_keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn traversal_keys_are_rejected() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir).await;
        let result = storage
            .upload_with_key("../outside.mp3", "audio/mpeg", Bytes::from_static(b"x"))
            .await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
        assert!(!dir.path().join("outside.mp3").exists());
    }
}
