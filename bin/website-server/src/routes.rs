//! HTTP routes of the website.

use crate::contact::submit_contact;
use crate::handlers::{health_check, not_found, page};
use crate::recovery::PanicReporter;
use crate::state::AppState;
use crate::tracking::tracking_layer;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::get;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

/// Largest accepted request body; a full contact form fits well below it.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Build the site router.
pub fn router(state: Arc<AppState>) -> Router {
    with_layers(site_routes(), state)
}

fn site_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health_check))
        .route("/", get(page))
        .route("/info", get(page))
        .route("/contact", get(page).post(submit_contact))
        .route("/contact_success", get(page))
        .route("/resume", get(page))
        .route("/resume/fr", get(page))
        .route("/legal", get(page))
        .fallback(not_found)
}

/// Wrap `routes` in the middleware stack shared by every route.
///
/// Panics are caught closest to the handlers so that the error page they
/// produce is still tracked and traced like any other response.
fn with_layers(routes: Router<Arc<AppState>>, state: Arc<AppState>) -> Router {
    let panic_reporter = PanicReporter::new(
        state.mailer.clone(),
        state.config.mail.clone(),
        state.config.site.name.clone(),
    );

    routes
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CatchPanicLayer::custom(panic_reporter))
        .layer(middleware::from_fn_with_state(state.clone(), tracking_layer))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
