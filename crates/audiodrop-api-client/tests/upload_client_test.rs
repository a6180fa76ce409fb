//! Upload client tests against a mock ingestion endpoint.

use audiodrop_api_client::{
    ClientConfig, ClientStatus, FilePicker, RecordingReporter, SubmitOutcome, TransferError,
    UploadClient, UploadFailure, FAILED_MESSAGE, UPLOADED_MESSAGE,
};
use mockito::Matcher;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const THREE_MB: usize = 3 * 1024 * 1024;

fn client_for(url: &str, timeout: Duration) -> (UploadClient, Arc<RecordingReporter>) {
    let reporter = Arc::new(RecordingReporter::new());
    let config = ClientConfig::new(url).with_timeout(timeout);
    let client = UploadClient::from_config(&config, reporter.clone()).unwrap();
    (client, reporter)
}

/// Write a `track.mp3` of `len` bytes and select it through the picker.
async fn select_track(client: &UploadClient, dir: &TempDir, len: usize) {
    let path = dir.path().join("track.mp3");
    let mut data = b"ID3".to_vec();
    data.resize(len, b'a');
    std::fs::write(&path, data).unwrap();

    let selection = FilePicker::default().pick(&path).await.unwrap();
    client.select_file(selection).await;
}

#[tokio::test]
async fn test_successful_upload_reports_uploaded_and_clears_selection() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/upload")
        .match_header(
            "content-type",
            Matcher::Regex("^multipart/form-data; boundary=".to_string()),
        )
        .with_status(200)
        .with_body(r#"{"key":"uploads/x-track.mp3"}"#)
        .expect(1)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let (client, reporter) = client_for(&server.url(), Duration::from_secs(30));
    select_track(&client, &dir, THREE_MB).await;

    let outcome = client.submit().await;

    mock.assert_async().await;
    assert!(matches!(outcome, SubmitOutcome::Uploaded { status: 200 }));
    assert_eq!(reporter.messages(), vec![UPLOADED_MESSAGE]);
    assert_eq!(client.status().await, ClientStatus::Idle);
    assert!(client.selection().await.is_none());
}

#[tokio::test]
async fn test_request_has_single_file_part() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/upload")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="file"; filename="track.mp3""#.to_string()),
            Matcher::Regex("(?i)content-type: audio/mpeg".to_string()),
        ]))
        .with_status(201)
        .expect(1)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let (client, reporter) = client_for(&server.url(), Duration::from_secs(30));
    select_track(&client, &dir, 64).await;

    assert!(client.submit().await.is_uploaded());
    mock.assert_async().await;
    assert_eq!(reporter.messages(), vec![UPLOADED_MESSAGE]);
}

#[tokio::test]
async fn test_server_error_reports_failure_and_keeps_selection() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/upload")
        .with_status(500)
        .with_body("Failed to upload to S3")
        .expect(1)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let (client, reporter) = client_for(&server.url(), Duration::from_secs(30));
    select_track(&client, &dir, THREE_MB).await;

    let outcome = client.submit().await;

    mock.assert_async().await;
    assert!(matches!(
        outcome,
        SubmitOutcome::Failed(UploadFailure::Status(500))
    ));
    assert_eq!(reporter.messages(), vec![FAILED_MESSAGE]);
    assert_eq!(
        client.status().await,
        ClientStatus::Selected {
            filename: "track.mp3".to_string()
        }
    );
    assert_eq!(client.selection().await.unwrap().len(), THREE_MB);
}

#[tokio::test]
async fn test_retry_after_failure_is_a_new_single_attempt() {
    let mut server = mockito::Server::new_async().await;
    let failing = server
        .mock("POST", "/upload")
        .with_status(503)
        .expect(1)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let (client, reporter) = client_for(&server.url(), Duration::from_secs(30));
    select_track(&client, &dir, 128).await;

    assert!(!client.submit().await.is_uploaded());
    failing.assert_async().await;
    failing.remove_async().await;

    let ok = server
        .mock("POST", "/upload")
        .with_status(200)
        .expect(1)
        .create_async()
        .await;
    assert!(client.submit().await.is_uploaded());
    ok.assert_async().await;

    assert_eq!(reporter.messages(), vec![FAILED_MESSAGE, UPLOADED_MESSAGE]);
}

#[tokio::test]
async fn test_no_selection_makes_no_request() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/upload")
        .expect(0)
        .create_async()
        .await;

    let (client, reporter) = client_for(&server.url(), Duration::from_secs(30));

    assert!(matches!(client.submit().await, SubmitOutcome::NoSelection));
    mock.assert_async().await;
    assert!(reporter.messages().is_empty());
}

#[tokio::test]
async fn test_unreachable_endpoint_reports_failure() {
    // Bind then drop a listener so the port is very likely closed.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let dir = TempDir::new().unwrap();
    let (client, reporter) = client_for(&format!("http://{}", addr), Duration::from_secs(5));
    select_track(&client, &dir, 64).await;

    let outcome = client.submit().await;

    assert!(matches!(
        outcome,
        SubmitOutcome::Failed(UploadFailure::Transport(_))
    ));
    assert_eq!(reporter.messages(), vec![FAILED_MESSAGE]);
    assert!(client.selection().await.is_some());
}

#[tokio::test]
async fn test_timeout_is_a_transport_failure() {
    // Accepts connections but never answers.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hold = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let dir = TempDir::new().unwrap();
    let (client, reporter) =
        client_for(&format!("http://{}", addr), Duration::from_millis(300));
    select_track(&client, &dir, 64).await;

    let outcome = client.submit().await;

    assert!(matches!(
        outcome,
        SubmitOutcome::Failed(UploadFailure::Transport(TransferError::Timeout(_)))
    ));
    assert_eq!(reporter.messages(), vec![FAILED_MESSAGE]);
    assert_eq!(
        client.status().await,
        ClientStatus::Selected {
            filename: "track.mp3".to_string()
        }
    );
    hold.abort();
}
