//! Constants shared by the client, the ingestion endpoint and the stack declaration.

/// Multipart field that carries the audio payload.
pub const UPLOAD_FIELD_NAME: &str = "file";

/// Route of the ingestion endpoint.
pub const UPLOAD_PATH: &str = "/upload";

/// Bucket the ingestion endpoint writes into unless `S3_BUCKET` says otherwise.
pub const DEFAULT_BUCKET_NAME: &str = "my-mp3-bucket";

/// Stack that owns the default bucket declaration.
pub const DEFAULT_STACK_NAME: &str = "InfraStack";

/// Key prefix for every object written by the ingestion endpoint.
pub const UPLOAD_KEY_PREFIX: &str = "uploads";

/// Banner served on `GET /`.
pub const WELCOME_MESSAGE: &str = "Welcome to the Audiodrop upload service!";
