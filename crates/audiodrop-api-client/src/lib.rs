//! Upload client for the Audiodrop ingestion endpoint.
//!
//! An [`UploadClient`] holds at most one selected audio file and submits it
//! as a single multipart request (one part named `file`). Every submission
//! ends in exactly one user-facing message: "Uploaded" on a 2xx response,
//! "Error uploading" on anything else, transport failures included.

pub mod client;
pub mod config;
pub mod reporter;
pub mod selection;
pub mod transport;

pub use client::{ClientStatus, SubmitOutcome, UploadClient, UploadFailure};
pub use config::ClientConfig;
pub use reporter::{
    RecordingReporter, StdoutReporter, UploadReporter, FAILED_MESSAGE, UPLOADED_MESSAGE,
};
pub use selection::{FilePicker, SelectionError, UploadSelection};
pub use transport::{HttpTransport, TransferError, TransferResponse, UploadTransport};
