//! Per-request session handle.
//!
//! Builds a [`Session`] from the session cookie, exposes it to handlers via
//! request extensions, and writes it back once the response is ready.

use axum::extract::{Request, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use sp_sessions::Session;

use crate::api::ApiError;
use crate::state::AppState;

pub async fn session_layer(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let presented = cookie_value(req.headers(), &state.session_options.cookie_name);
    let session = Session::new(
        state.sessions.clone(),
        state.session_options.clone(),
        presented.clone(),
    );
    req.extensions_mut().insert(session.clone());

    let mut response = next.run(req).await;

    if let Err(e) = session.commit() {
        return ApiError(e).into_response();
    }

    let name = &state.session_options.cookie_name;
    let cookie = match session.id() {
        Some(id) if presented.as_deref() != Some(id.as_str()) => {
            Some(format!("{name}={id}; Path=/; HttpOnly; SameSite=Lax"))
        }
        None if session.is_destroyed() && presented.is_some() => {
            Some(format!("{name}=deleted; Path=/; Max-Age=0; HttpOnly; SameSite=Lax"))
        }
        _ => None,
    };
    if let Some(value) = cookie.and_then(|c| HeaderValue::from_str(&c).ok()) {
        response.headers_mut().append(SET_COOKIE, value);
    }
    response
}

/// Value of the named cookie across all `Cookie` headers.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim_matches('"').to_owned())
        .filter(|v| !v.is_empty())
}
