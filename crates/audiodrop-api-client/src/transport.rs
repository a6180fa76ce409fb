//! Network transfer of a selection

use async_trait::async_trait;
use audiodrop_core::constants::UPLOAD_FIELD_NAME;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::time::Duration;

use crate::config::ClientConfig;
use crate::selection::UploadSelection;

/// Failure to obtain any HTTP response.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("Upload timed out after {0:?}")]
    Timeout(Duration),

    #[error("Could not connect to the upload endpoint: {0}")]
    Connect(String),

    #[error("Upload request failed: {0}")]
    Request(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

/// Status line of the endpoint's answer. The body is not inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferResponse {
    pub status: u16,
}

impl TransferResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues exactly one transfer attempt per call.
#[async_trait]
pub trait UploadTransport: Send + Sync {
    async fn send(&self, selection: &UploadSelection) -> Result<TransferResponse, TransferError>;
}

/// Multipart `POST` over HTTP.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
    upload_url: String,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, TransferError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransferError::Client(e.to_string()))?;

        Ok(Self {
            client,
            upload_url: config.upload_url(),
            timeout: config.timeout,
        })
    }

    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }

    fn classify(&self, err: reqwest::Error) -> TransferError {
        if err.is_timeout() {
            TransferError::Timeout(self.timeout)
        } else if err.is_connect() {
            TransferError::Connect(err.to_string())
        } else {
            TransferError::Request(err.to_string())
        }
    }
}

#[async_trait]
impl UploadTransport for HttpTransport {
    async fn send(&self, selection: &UploadSelection) -> Result<TransferResponse, TransferError> {
        let part = Part::stream_with_length(selection.data().clone(), selection.len() as u64)
            .file_name(selection.filename().to_string())
            .mime_str(selection.mime_hint())
            .map_err(|e| TransferError::Request(e.to_string()))?;
        let form = Form::new().part(UPLOAD_FIELD_NAME, part);

        let start = std::time::Instant::now();
        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status().as_u16();
        tracing::debug!(
            url = %self.upload_url,
            filename = %selection.filename(),
            size_bytes = selection.len(),
            status,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Upload request completed"
        );

        Ok(TransferResponse { status })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_2xx_is_success() {
        assert!(TransferResponse { status: 200 }.is_success());
        assert!(TransferResponse { status: 204 }.is_success());
        assert!(!TransferResponse { status: 302 }.is_success());
        assert!(!TransferResponse { status: 500 }.is_success());
    }
}
