//! The upload state machine
//!
//! `Idle -> Selected -> Submitting -> Idle` on success, or back to `Selected`
//! with the same file on failure. The state lock is never held across an
//! await, so `select_file` never waits on the network, and a `submit()` future
//! dropped mid-transfer still leaves `Submitting`.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::ClientConfig;
use crate::reporter::{UploadReporter, FAILED_MESSAGE, UPLOADED_MESSAGE};
use crate::selection::UploadSelection;
use crate::transport::{HttpTransport, TransferError, UploadTransport};

enum ClientState {
    Idle,
    Selected(UploadSelection),
    Submitting {
        in_flight: UploadSelection,
        /// Picked while the transfer was pending; wins once it completes
        replacement: Option<UploadSelection>,
    },
}

/// Snapshot of the client state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientStatus {
    Idle,
    Selected { filename: String },
    Submitting { filename: String },
}

#[derive(Debug)]
pub enum UploadFailure {
    /// The endpoint answered with a non-2xx status
    Status(u16),
    /// No response was obtained
    Transport(TransferError),
}

/// Result of one `submit()` call.
#[derive(Debug)]
pub enum SubmitOutcome {
    Uploaded { status: u16 },
    Failed(UploadFailure),
    /// Nothing selected; no request was made
    NoSelection,
    /// A submission is already pending; no request was made
    AlreadySubmitting,
}

impl SubmitOutcome {
    pub fn is_uploaded(&self) -> bool {
        matches!(self, SubmitOutcome::Uploaded { .. })
    }

    /// Message shown to the user, if this outcome produces one.
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            SubmitOutcome::Uploaded { .. } => Some(UPLOADED_MESSAGE),
            SubmitOutcome::Failed(_) => Some(FAILED_MESSAGE),
            SubmitOutcome::NoSelection | SubmitOutcome::AlreadySubmitting => None,
        }
    }
}

fn lock_state(state: &Mutex<ClientState>) -> MutexGuard<'_, ClientState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Leave `Submitting` once a transfer is over. A selection made meanwhile
/// wins; otherwise success clears the selection and failure keeps it.
fn settle(state: &Mutex<ClientState>, in_flight: UploadSelection, uploaded: bool) {
    let mut state = lock_state(state);
    let replacement = match std::mem::replace(&mut *state, ClientState::Idle) {
        ClientState::Submitting { replacement, .. } => replacement,
        ClientState::Selected(other) => Some(other),
        ClientState::Idle => None,
    };
    *state = match replacement {
        Some(newer) => ClientState::Selected(newer),
        None if uploaded => ClientState::Idle,
        None => ClientState::Selected(in_flight),
    };
}

/// Owns the `Submitting` state for one transfer.
struct SubmitGuard<'a> {
    state: &'a Mutex<ClientState>,
    in_flight: Option<UploadSelection>,
}

impl SubmitGuard<'_> {
    fn complete(mut self, uploaded: bool) {
        if let Some(selection) = self.in_flight.take() {
            settle(self.state, selection, uploaded);
        }
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        if let Some(selection) = self.in_flight.take() {
            tracing::warn!(
                filename = %selection.filename(),
                "Upload abandoned before a response arrived"
            );
            settle(self.state, selection, false);
        }
    }
}

pub struct UploadClient {
    transport: Arc<dyn UploadTransport>,
    reporter: Arc<dyn UploadReporter>,
    state: Mutex<ClientState>,
}

impl UploadClient {
    pub fn new(transport: Arc<dyn UploadTransport>, reporter: Arc<dyn UploadReporter>) -> Self {
        Self {
            transport,
            reporter,
            state: Mutex::new(ClientState::Idle),
        }
    }

    /// Client that posts to `config.upload_url()` over HTTP.
    pub fn from_config(
        config: &ClientConfig,
        reporter: Arc<dyn UploadReporter>,
    ) -> Result<Self, TransferError> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::new(Arc::new(transport), reporter))
    }

    /// Replace the current selection. During a pending submission the new
    /// file is kept aside and becomes the selection once the transfer ends.
    pub async fn select_file(&self, selection: UploadSelection) {
        tracing::debug!(filename = %selection.filename(), "Selection replaced");
        let mut state = lock_state(&self.state);
        match &mut *state {
            ClientState::Submitting { replacement, .. } => *replacement = Some(selection),
            other => *other = ClientState::Selected(selection),
        }
    }

    pub async fn status(&self) -> ClientStatus {
        let state = lock_state(&self.state);
        match &*state {
            ClientState::Idle => ClientStatus::Idle,
            ClientState::Selected(selection) => ClientStatus::Selected {
                filename: selection.filename().to_string(),
            },
            ClientState::Submitting { in_flight, .. } => ClientStatus::Submitting {
                filename: in_flight.filename().to_string(),
            },
        }
    }

    /// The file a `submit()` would send now, or is sending.
    pub async fn selection(&self) -> Option<UploadSelection> {
        let state = lock_state(&self.state);
        match &*state {
            ClientState::Idle => None,
            ClientState::Selected(selection) => Some(selection.clone()),
            ClientState::Submitting {
                in_flight,
                replacement,
            } => Some(replacement.as_ref().unwrap_or(in_flight).clone()),
        }
    }

    /// Send the selected file in one request and report the outcome.
    pub async fn submit(&self) -> SubmitOutcome {
        let selection = {
            let mut state = lock_state(&self.state);
            match std::mem::replace(&mut *state, ClientState::Idle) {
                ClientState::Selected(selection) => {
                    *state = ClientState::Submitting {
                        in_flight: selection.clone(),
                        replacement: None,
                    };
                    selection
                }
                ClientState::Idle => {
                    tracing::debug!("Submit ignored: no file selected");
                    return SubmitOutcome::NoSelection;
                }
                submitting @ ClientState::Submitting { .. } => {
                    *state = submitting;
                    tracing::debug!("Submit ignored: upload already in progress");
                    return SubmitOutcome::AlreadySubmitting;
                }
            }
        };
        let guard = SubmitGuard {
            state: &self.state,
            in_flight: Some(selection.clone()),
        };

        let result = self.transport.send(&selection).await;

        let outcome = match result {
            Ok(response) if response.is_success() => SubmitOutcome::Uploaded {
                status: response.status,
            },
            Ok(response) => SubmitOutcome::Failed(UploadFailure::Status(response.status)),
            Err(err) => SubmitOutcome::Failed(UploadFailure::Transport(err)),
        };
        guard.complete(outcome.is_uploaded());

        match &outcome {
            SubmitOutcome::Uploaded { status } => tracing::info!(
                filename = %selection.filename(),
                size_bytes = selection.len(),
                status = *status,
                "Upload succeeded"
            ),
            SubmitOutcome::Failed(UploadFailure::Status(status)) => tracing::warn!(
                filename = %selection.filename(),
                status = *status,
                "Upload rejected by endpoint"
            ),
            SubmitOutcome::Failed(UploadFailure::Transport(err)) => tracing::warn!(
                filename = %selection.filename(),
                error = %err,
                "Upload transport failure"
            ),
            SubmitOutcome::NoSelection | SubmitOutcome::AlreadySubmitting => {}
        }

        if let Some(message) = outcome.user_message() {
            self.reporter.report(message);
        }
        outcome
    }
}
