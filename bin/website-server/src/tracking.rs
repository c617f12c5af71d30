//! Request tracking middleware
//!
//! Resolves the visitor behind every request, times the handler and stores
//! one `HttpRequestRecord` per response.

use crate::state::AppState;
use axum::body::{Body, HttpBody};
use axum::extract::{ConnectInfo, Request, State};
use axum::http::header::{CONTENT_LENGTH, COOKIE, SET_COOKIE, USER_AGENT};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use chrono::{DateTime, Utc};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, warn};
use website_common::{HttpRequestRecord, RecordId, Visitor};
use website_report::{client_ip, visitor_fingerprint};
use website_store::{StoreResult, VisitLog};

/// Name of the cookie carrying the visitor ID
pub const VISITOR_COOKIE: &str = "visitor_id";

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Paths that are served but never recorded
const UNTRACKED_PATHS: &[&str] = &["/health"];

/// Value of cookie `name` in the request headers, if present.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"'))
        .filter(|value| !value.is_empty())
}

fn visitor_cookie(visitor_id: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{VISITOR_COOKIE}={visitor_id}; Path=/; HttpOnly; SameSite=Strict"
    ))
    .ok()
}

/// Find the visitor behind a request, creating it on first sight.
///
/// A cookie naming a known visitor wins. Otherwise the fingerprint is the
/// visitor ID, stored as a new visitor if it was never seen.
pub fn resolve_visitor(
    visits: &dyn VisitLog,
    cookie_id: Option<&str>,
    fingerprint: &str,
    page: &str,
    now: DateTime<Utc>,
) -> StoreResult<String> {
    if let Some(id) = cookie_id {
        if visits.get_visitor(id)?.is_some() {
            return Ok(id.to_string());
        }
    }

    if visits.get_visitor(fingerprint)?.is_none() {
        debug!("New visitor {} on {}", fingerprint, page);
        visits.store_visitor(&Visitor {
            id: fingerprint.to_string(),
            first_visited_at: now,
            first_visited_page: page.to_string(),
        })?;
    }
    Ok(fingerprint.to_string())
}

fn response_length(response: &Response) -> u64 {
    response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
        .or_else(|| response.body().size_hint().exact())
        .unwrap_or(0)
}

/// Middleware recording every request except the untracked paths
pub async fn tracking_layer(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if UNTRACKED_PATHS.contains(&request.uri().path()) {
        return next.run(request).await;
    }

    let start = Instant::now();
    let created_at = Utc::now();

    let method = request.method().to_string();
    let url = request
        .uri()
        .path_and_query()
        .map_or_else(|| request.uri().path().to_string(), ToString::to_string);
    let headers = request.headers();
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let forwarded_for = headers.get(FORWARDED_FOR).and_then(|v| v.to_str().ok());
    let ip_address = client_ip(forwarded_for, peer);
    let fingerprint = visitor_fingerprint(&ip_address, &user_agent);
    let cookie_id = cookie_value(headers, VISITOR_COOKIE).map(str::to_string);

    let visitor_id = resolve_visitor(
        state.visits.as_ref(),
        cookie_id.as_deref(),
        &fingerprint,
        request.uri().path(),
        created_at,
    )
    .unwrap_or_else(|e| {
        warn!("Failed to resolve visitor, using fingerprint: {}", e);
        fingerprint.clone()
    });

    let mut response = next.run(request).await;
    let elapsed = start.elapsed();

    let record = HttpRequestRecord {
        id: RecordId::new(),
        created_at,
        visitor_id: visitor_id.clone(),
        method,
        url,
        user_agent,
        ip_address,
        content_length: response_length(&response),
        status: response.status().as_u16(),
        time_to_handle_us: u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX),
    };
    if let Err(e) = state.visits.store_http_request(&record) {
        error!("Failed to store request {} {}: {}", record.method, record.url, e);
    }

    if cookie_id.as_deref() != Some(visitor_id.as_str()) {
        if let Some(cookie) = visitor_cookie(&visitor_id) {
            response.headers_mut().append(SET_COOKIE, cookie);
        }
    }

    response
}
