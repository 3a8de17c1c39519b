//! Debug bar middleware.
//!
//! Only layered in debug mode.  Registers the session panel for the request;
//! a delete signal short-circuits into a redirect before the handler runs.
//! Otherwise the rendered bar is spliced into HTML responses.

use axum::body::{Body, HttpBody};
use axum::extract::{Request, State};
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE, HOST, LOCATION};
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use url::Url;

use sp_domain::error::{Error, Result};
use sp_panel::{Bar, Registration};
use sp_sessions::Session;

use crate::api::ApiError;
use crate::state::AppState;

pub async fn debug_bar(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let Some(session) = req.extensions().get::<Session>().cloned() else {
        tracing::warn!("debug bar layered without a session layer");
        return next.run(req).await;
    };

    let url = match request_url(&req) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(error = %e, "cannot rebuild request url, skipping debug bar");
            return next.run(req).await;
        }
    };

    let mut bar = Bar::new();
    match state.extension.register(&mut bar, &session, &url) {
        Ok(Registration::Registered) => {}
        Ok(Registration::Skipped) => return next.run(req).await,
        Ok(Registration::Redirect(redirect)) => return found(redirect.location.as_str()),
        Err(e) => return ApiError(e).into_response(),
    }

    let response = next.run(req).await;
    inject(&bar, response, state.config.server.max_inject_bytes).await
}

/// Absolute URL of the request, as the client addressed it.
pub fn request_url(req: &Request) -> Result<Url> {
    let headers = req.headers();
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .filter(|p| *p == "http" || *p == "https")
        .unwrap_or("http");
    let host = headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| req.uri().authority().map(|a| a.as_str()))
        .unwrap_or("localhost");
    let path = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    Url::parse(&format!("{scheme}://{host}{path}")).map_err(|e| Error::Url(e.to_string()))
}

fn found(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::FOUND, [(LOCATION, value)]).into_response(),
        Err(e) => ApiError(Error::Url(e.to_string())).into_response(),
    }
}

async fn inject(bar: &Bar, response: Response, limit: usize) -> Response {
    let is_html = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("text/html"));
    if !is_html || !fits(&response, limit) {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, limit).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "failed to buffer html body for debug bar");
            return ApiError(Error::Other(format!("buffering response: {e}"))).into_response();
        }
    };

    let html = bar.inject(&String::from_utf8_lossy(&bytes));
    parts.headers.remove(CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(html))
}

/// Whether the body is known to be at most `limit` bytes.  Bodies without a
/// declared or hinted upper bound are streamed through untouched.
fn fits(response: &Response, limit: usize) -> bool {
    let declared = response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    let upper = declared.or_else(|| response.body().size_hint().upper());
    upper.is_some_and(|len| len <= limit as u64)
}
