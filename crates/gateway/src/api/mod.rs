pub mod demo;

use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::layers::{debug_bar, session};
use crate::state::AppState;

/// Build the application router.
///
/// The debug bar layer is only added when debug mode is on, inside the
/// session layer so it sees the request's session handle.  `/healthz` is
/// outside both.
pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/", get(demo::index))
        .route("/cart/add", get(demo::cart_add))
        .route("/remember", get(demo::remember));

    if state.extension.is_enabled() {
        app = app.layer(middleware::from_fn_with_state(
            state.clone(),
            debug_bar::debug_bar,
        ));
    }

    app.layer(middleware::from_fn_with_state(
        state.clone(),
        session::session_layer,
    ))
    .route("/healthz", get(demo::health))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Errors
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Build a standardized JSON error response: `{ "error": "<message>" }`.
pub fn api_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

/// Session-layer failure surfaced as a 500.
#[derive(Debug)]
pub struct ApiError(pub sp_domain::error::Error);

impl From<sp_domain::error::Error> for ApiError {
    fn from(e: sp_domain::error::Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "request failed");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string())
    }
}
