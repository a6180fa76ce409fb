use crate::object::ObjectStorage;
use crate::StorageBackend;
use object_store::memory::InMemory;
use std::sync::Arc;

impl ObjectStorage {
    /// Create a bucket that lives in process memory.
    ///
    /// Used by tests and by the in-memory provisioning engine; contents are
    /// lost when the last handle is dropped.
    pub fn in_memory(bucket: impl Into<String>) -> Self {
        let bucket = bucket.into();
        let url_base = format!("memory://{}", bucket);
        ObjectStorage::from_parts(
            Arc::new(InMemory::new()),
            bucket,
            url_base,
            StorageBackend::Memory,
        )
    }
}
