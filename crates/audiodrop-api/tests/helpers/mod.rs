//! Test helpers: build AppState and router for integration tests.

use audiodrop_api::setup::routes;
use audiodrop_api::state::AppState;
use audiodrop_core::{BaseConfig, Config, IngestConfig, StorageBackend};
use audiodrop_storage::{ObjectStorage, Storage};
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use std::sync::Arc;

pub const MAX_AUDIO_SIZE_BYTES: usize = 4 * 1024 * 1024;

/// Test application: server plus the bucket it writes into.
pub struct TestApp {
    pub server: TestServer,
    pub storage: Arc<dyn Storage>,
}

pub fn test_config() -> Config {
    Config(Box::new(IngestConfig {
        base: BaseConfig {
            server_port: 0,
            cors_origins: vec!["*".to_string()],
            environment: "test".to_string(),
            http_concurrency_limit: 64,
        },
        storage_backend: Some(StorageBackend::Memory),
        s3_bucket: Some("my-mp3-bucket".to_string()),
        s3_region: None,
        s3_endpoint: None,
        aws_region: None,
        local_storage_path: None,
        local_storage_base_url: None,
        max_audio_size_bytes: MAX_AUDIO_SIZE_BYTES,
        audio_allowed_extensions: vec!["mp3".to_string(), "wav".to_string()],
        audio_allowed_content_types: vec![
            "audio/mpeg".to_string(),
            "audio/mp3".to_string(),
            "audio/wav".to_string(),
        ],
    }))
}

/// Setup test app with an in-memory bucket.
pub fn setup_test_app() -> TestApp {
    let config = test_config();
    let storage: Arc<dyn Storage> = Arc::new(ObjectStorage::in_memory(config.s3_bucket()));
    let state = Arc::new(AppState::new(config.clone(), storage.clone()));
    let router = routes::setup_routes(&config, state).expect("routes");

    TestApp {
        server: TestServer::new(router).expect("test server"),
        storage,
    }
}

/// A multipart form with a single `file` part.
pub fn audio_form(filename: &str, content_type: &str, data: Vec<u8>) -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(data)
            .file_name(filename)
            .mime_type(content_type),
    )
}

/// Bytes that look enough like an MP3 for the endpoint (it does not inspect content).
pub fn mp3_bytes(len: usize) -> Vec<u8> {
    let mut data = b"ID3\x04\x00\x00\x00\x00\x00\x00".to_vec();
    data.resize(len, 0xAB);
    data
}
