//! Domain models exchanged between storage, the ingestion endpoint and clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An object written into a bucket.
///
/// Returned as the JSON body of a successful `POST /upload`; clients treat the
/// body as informational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    pub key: String,
    pub bucket: String,
    pub size_bytes: u64,
    pub content_type: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

impl StoredObject {
    /// `s3://{bucket}/{key}` style location, independent of the backend URL scheme.
    pub fn object_uri(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_uri_uses_bucket_and_key() {
        let object = StoredObject {
            key: "uploads/abc-track.mp3".to_string(),
            bucket: "my-mp3-bucket".to_string(),
            size_bytes: 3,
            content_type: "audio/mpeg".to_string(),
            url: "memory://my-mp3-bucket/uploads/abc-track.mp3".to_string(),
            created_at: Utc::now(),
        };
        assert_eq!(object.object_uri(), "s3://my-mp3-bucket/uploads/abc-track.mp3");
    }
}
