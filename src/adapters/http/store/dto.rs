//! HTTP DTOs for the store endpoint.
//!
//! Field names match what the browser-side sync client already expects.

use serde::{Deserialize, Serialize};

/// Error body: `{ "error": ..., "details"?: ... }`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Acknowledgement of a POST.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SaveResponse {
    pub success: bool,
    pub timestamp: String,
}

/// Acknowledgement of a DELETE.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClearResponse {
    pub success: bool,
    pub message: String,
}
