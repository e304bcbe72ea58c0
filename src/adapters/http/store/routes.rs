//! Axum router configuration for the store endpoint.

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{clear_store, get_store, method_not_allowed, save_store, StoreAppState};

/// Create the store API router.
///
/// # Routes
/// - `GET /store` - Fetch the shared record
/// - `POST /store` - Replace the shared record
/// - `DELETE /store` - Delete the shared record
pub fn store_routes() -> Router<StoreAppState> {
    Router::new().route(
        "/store",
        get(get_store)
            .post(save_store)
            .delete(clear_store)
            .fallback(method_not_allowed),
    )
}

/// Complete router mounted under `/api`, with CORS and request tracing.
pub fn store_router(state: StoreAppState) -> Router {
    Router::new()
        .nest("/api", store_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
