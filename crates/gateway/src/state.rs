use std::sync::Arc;

use sp_domain::config::Config;
use sp_panel::SessionPanelExtension;
use sp_sessions::{SessionOptions, SessionStore};

/// Shared application state passed to all handlers and layers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: Arc<SessionStore>,
    pub session_options: Arc<SessionOptions>,
    /// Decided once at startup from `debug.enabled`.
    pub extension: SessionPanelExtension,
}
