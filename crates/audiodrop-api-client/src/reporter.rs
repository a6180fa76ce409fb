//! User-facing outcome messages

use std::sync::Mutex;

pub const UPLOADED_MESSAGE: &str = "Uploaded";
pub const FAILED_MESSAGE: &str = "Error uploading";

/// Receives the single message produced by each completed submission.
pub trait UploadReporter: Send + Sync {
    fn report(&self, message: &str);
}

/// Prints each message on its own line.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutReporter;

impl UploadReporter for StdoutReporter {
    fn report(&self, message: &str) {
        println!("{}", message);
    }
}

/// Keeps every reported message in order.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    messages: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl UploadReporter for RecordingReporter {
    fn report(&self, message: &str) {
        let mut messages = self
            .messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        messages.push(message.to_string());
    }
}
