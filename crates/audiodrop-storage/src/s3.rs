use crate::object::ObjectStorage;
use crate::traits::{StorageError, StorageResult};
use crate::StorageBackend;
use object_store::aws::AmazonS3Builder;
use std::sync::Arc;

impl ObjectStorage {
    /// Create an S3-backed storage
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint for S3-compatible providers
    ///   (e.g. "http://localhost:4566" for LocalStack, "http://localhost:9000" for MinIO)
    ///
    /// Credentials are read from the standard `AWS_*` environment variables.
    pub fn s3(bucket: String, region: String, endpoint_url: Option<String>) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        let url_base = s3_url_base(&bucket, &region, endpoint_url.as_deref());

        tracing::info!(
            bucket = %bucket,
            region = %region,
            endpoint = ?endpoint_url,
            "S3 storage configured"
        );

        Ok(ObjectStorage::from_parts(
            Arc::new(store),
            bucket,
            url_base,
            StorageBackend::S3,
        ))
    }
}

/// Public URL prefix for objects in `bucket`.
///
/// S3-compatible endpoints use path-style `{endpoint}/{bucket}`; AWS uses the
/// virtual-hosted `https://{bucket}.s3.{region}.amazonaws.com` form.
fn s3_url_base(bucket: &str, region: &str, endpoint_url: Option<&str>) -> String {
    match endpoint_url {
        Some(endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), bucket),
        None => format!("https://{}.s3.{}.amazonaws.com", bucket, region),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aws_urls_are_virtual_hosted() {
        assert_eq!(
            s3_url_base("my-mp3-bucket", "us-east-1", None),
            "https://my-mp3-bucket.s3.us-east-1.amazonaws.com"
        );
    }

    #[test]
    fn custom_endpoints_are_path_style() {
        assert_eq!(
            s3_url_base("my-mp3-bucket", "us-east-1", Some("http://localstack:4566/")),
            "http://localstack:4566/my-mp3-bucket"
        );
    }
}
