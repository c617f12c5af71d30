//! Page handlers.

use crate::error::PageError;
use crate::state::AppState;
use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use std::sync::Arc;
use website_common::Error;

/// GET on any prerendered page
pub async fn page(State(state): State<Arc<AppState>>, uri: Uri) -> Response {
    match state.pages.get(uri.path()) {
        Some(html) => Html(html).into_response(),
        None => not_found(State(state), uri).await.into_response(),
    }
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Fallback for unknown routes
pub async fn not_found(State(state): State<Arc<AppState>>, uri: Uri) -> PageError {
    PageError::from_error(
        &state.config.site.name,
        &Error::NotFound(uri.path().to_string()),
    )
}
