//! Small demo pages that put data into both session layers.
//!
//! - `GET /`                          HTML page
//! - `GET /cart/add?item=..`          managed `cart` section, 30 min expiry
//! - `GET /remember?key=..&value=..`  raw session key
//! - `GET /healthz`                   liveness + stored session count

use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Json, Redirect};
use axum::Extension;
use serde::Deserialize;
use serde_json::Value;

use sp_panel::templates::esc;
use sp_sessions::{Expiry, Session};

use crate::api::ApiError;
use crate::state::AppState;

const CART_TTL_SECS: i64 = 30 * 60;

pub async fn index(Extension(session): Extension<Session>) -> Result<Html<String>, ApiError> {
    session.auto_start()?;

    let items: Vec<String> = session
        .section("cart")
        .get("items")
        .and_then(|v| match v {
            Value::Array(a) => Some(a),
            _ => None,
        })
        .unwrap_or_default()
        .into_iter()
        .map(|v| match v {
            Value::String(s) => s,
            other => other.to_string(),
        })
        .collect();

    let cart_html = if items.is_empty() {
        "<em>empty</em>".to_owned()
    } else {
        items
            .iter()
            .map(|i| format!("<li>{}</li>", esc(i)))
            .collect::<Vec<_>>()
            .join("\n")
    };

    Ok(Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Session panel demo</title>
</head>
<body>
<h1>Session panel demo</h1>
<h2>Cart</h2>
<ul>{cart_html}</ul>
<p>
  <a href="/cart/add?item=apple">add apple</a> &middot;
  <a href="/cart/add?item=pear">add pear</a> &middot;
  <a href="/remember?key=theme&value=dark">remember theme</a>
</p>
</body>
</html>"#
    )))
}

#[derive(Debug, Deserialize)]
pub struct CartAddQuery {
    pub item: String,
}

pub async fn cart_add(
    Extension(session): Extension<Session>,
    Query(q): Query<CartAddQuery>,
) -> Result<Redirect, ApiError> {
    session.auto_start()?;
    let cart = session.section("cart");
    let mut items = match cart.get("items") {
        Some(Value::Array(a)) => a,
        _ => Vec::new(),
    };
    items.push(Value::String(q.item));
    cart.set("items", Value::Array(items))?;
    cart.set_expiration(Expiry::in_secs(CART_TTL_SECS))?;
    Ok(Redirect::to("/"))
}

#[derive(Debug, Deserialize)]
pub struct RememberQuery {
    pub key: String,
    pub value: String,
}

pub async fn remember(
    Extension(session): Extension<Session>,
    Query(q): Query<RememberQuery>,
) -> Result<Redirect, ApiError> {
    session.raw_set(&q.key, Value::String(q.value))?;
    Ok(Redirect::to("/"))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "sessions": state.sessions.len(),
        "debug": state.extension.is_enabled(),
    }))
}
