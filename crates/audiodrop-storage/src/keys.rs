//! Shared key generation for storage backends.
//!
//! Key format: `uploads/{uuid}-{filename}`.

use audiodrop_core::constants::UPLOAD_KEY_PREFIX;
use uuid::Uuid;

use crate::traits::{StorageError, StorageResult};

/// Generate a unique storage key for an already-sanitized filename.
pub fn generate_storage_key(filename: &str) -> String {
    format!("{}/{}-{}", UPLOAD_KEY_PREFIX, Uuid::new_v4(), filename)
}

/// Reject keys that could escape the bucket root.
pub fn validate_storage_key(storage_key: &str) -> StorageResult<()> {
    if storage_key.is_empty()
        || storage_key.starts_with('/')
        || storage_key.split('/').any(|segment| segment == ".." || segment.is_empty())
    {
        return Err(StorageError::InvalidKey(storage_key.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_keys_are_unique_and_prefixed() {
        let a = generate_storage_key("track.mp3");
        let b = generate_storage_key("track.mp3");
        assert_ne!(a, b);
        assert!(a.starts_with("uploads/"));
        assert!(a.ends_with("-track.mp3"));
        assert!(validate_storage_key(&a).is_ok());
    }

    #[test]
    fn traversal_and_absolute_keys_are_rejected() {
        for key in ["", "/etc/passwd", "uploads/../secret", "uploads//track.mp3"] {
            assert!(validate_storage_key(key).is_err(), "{}", key);
        }
    }
}
