//! HTTP error response body
//!
//! The `IntoResponse` conversion for `AppError` lives in `audiodrop-api`
//! (orphan rule: neither the trait nor the type belong to this crate).

use serde::{Deserialize, Serialize};

/// Standard error response format for HTTP APIs
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    pub code: String,
}
