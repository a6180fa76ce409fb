//! Audiodrop API Library
//!
//! The ingestion endpoint: `POST /upload` takes one multipart part named
//! `file`, validates it as audio and writes it to the configured bucket.

mod handlers;
mod utils;

pub mod error;
pub mod setup;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
