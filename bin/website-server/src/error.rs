//! Error page responses.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use website_content::render_error_page;

/// A failed request, answered with the HTML error page.
#[derive(Debug)]
pub struct PageError {
    pub status: StatusCode,
    pub message: String,
    pub site_name: String,
}

impl PageError {
    pub fn new(status: StatusCode, site_name: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            site_name: site_name.to_string(),
        }
    }

    /// Map a domain error, keeping its status code.
    pub fn from_error(site_name: &str, err: &website_common::Error) -> Self {
        let status = StatusCode::from_u16(err.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, site_name, err.to_string())
    }
}

/// Render the error page for `status` as a response.
pub fn error_page_response(site_name: &str, status: StatusCode, message: &str) -> Response {
    let reason = status.canonical_reason().unwrap_or("Error");
    let html = render_error_page(site_name, status.as_u16(), reason, message);
    (status, Html(html)).into_response()
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        error_page_response(&self.site_name, self.status, &self.message)
    }
}
