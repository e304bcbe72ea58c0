//! HTTP handlers for the store endpoint.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;

use crate::domain::foundation::{StoreSnapshot, Timestamp};
use crate::ports::{SnapshotRepository, SnapshotRepositoryError};

use super::dto::{ClearResponse, ErrorResponse, SaveResponse};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for the store routes.
///
/// `repository` is `None` when no backend was configured; every request
/// then answers 500 instead of the process refusing to start.
#[derive(Clone)]
pub struct StoreAppState {
    repository: Option<Arc<dyn SnapshotRepository>>,
}

impl StoreAppState {
    pub fn new(repository: Option<Arc<dyn SnapshotRepository>>) -> Self {
        Self { repository }
    }

    /// State with no backend configured.
    pub fn unconfigured() -> Self {
        Self { repository: None }
    }

    pub fn is_configured(&self) -> bool {
        self.repository.is_some()
    }

    fn repository(&self) -> Result<&Arc<dyn SnapshotRepository>, StoreApiError> {
        self.repository.as_ref().ok_or(StoreApiError::NotConfigured)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// GET /store - Current record, `{}` when empty
pub async fn get_store(
    State(state): State<StoreAppState>,
) -> Result<impl IntoResponse, StoreApiError> {
    let snapshot = state.repository()?.load().await?.unwrap_or_default();
    Ok(Json(snapshot))
}

/// POST /store - Replace the record
pub async fn save_store(
    State(state): State<StoreAppState>,
    body: Bytes,
) -> Result<impl IntoResponse, StoreApiError> {
    let repository = state.repository()?;

    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(StoreApiError::NoData);
    }
    let value: serde_json::Value =
        serde_json::from_slice(&body).map_err(|_| StoreApiError::NoData)?;
    let snapshot = StoreSnapshot::from_value(value).map_err(|_| StoreApiError::NoData)?;

    repository.save(&snapshot).await?;
    tracing::info!(keys = snapshot.len(), "Store record replaced");

    Ok(Json(SaveResponse {
        success: true,
        timestamp: Timestamp::now().to_rfc3339(),
    }))
}

/// DELETE /store - Remove the record
pub async fn clear_store(
    State(state): State<StoreAppState>,
) -> Result<impl IntoResponse, StoreApiError> {
    state.repository()?.delete().await?;
    tracing::info!("Store record deleted");

    Ok(Json(ClearResponse {
        success: true,
        message: "Database cleared".to_string(),
    }))
}

/// Any other method
pub async fn method_not_allowed(State(state): State<StoreAppState>) -> StoreApiError {
    match state.repository() {
        Ok(_) => StoreApiError::MethodNotAllowed,
        Err(e) => e,
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that maps store failures to HTTP responses.
#[derive(Debug)]
pub enum StoreApiError {
    NotConfigured,
    NoData,
    MethodNotAllowed,
    Backend(String),
}

impl From<SnapshotRepositoryError> for StoreApiError {
    fn from(err: SnapshotRepositoryError) -> Self {
        Self::Backend(err.to_string())
    }
}

impl IntoResponse for StoreApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            StoreApiError::NotConfigured => {
                tracing::error!("Store backend is not configured");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Database configuration missing")
                        .with_details("Set REVENUE_DESK__REDIS__URL to enable the store."),
                )
            }
            StoreApiError::NoData => (StatusCode::BAD_REQUEST, ErrorResponse::new("No data provided")),
            StoreApiError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                ErrorResponse::new("Method not allowed"),
            ),
            StoreApiError::Backend(message) => {
                tracing::error!(error = %message, "Store backend error");
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::new(message))
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_statuses() {
        assert_eq!(
            StoreApiError::NotConfigured.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            StoreApiError::NoData.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            StoreApiError::MethodNotAllowed.into_response().status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            StoreApiError::from(SnapshotRepositoryError::Backend("down".into()))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
