//! Application state construction and background loops.

use std::sync::Arc;

use anyhow::Context;

use sp_domain::config::Config;
use sp_panel::SessionPanelExtension;
use sp_sessions::{SessionOptions, SessionStore};

use crate::state::AppState;

pub fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    let sessions = match &config.sessions.state_path {
        Some(path) => SessionStore::new(path)
            .with_context(|| format!("opening session store under {}", path.display()))?,
        None => {
            tracing::info!("session store is in-memory (no sessions.state_path)");
            SessionStore::in_memory()
        }
    };

    let extension = SessionPanelExtension::from_config(&config.debug);
    if extension.is_enabled() {
        tracing::warn!("debug mode on: session panel enabled, delete links are unauthenticated");
    }

    Ok(AppState {
        session_options: Arc::new(SessionOptions::from(&config.sessions)),
        sessions: Arc::new(sessions),
        extension,
        config,
    })
}

pub fn spawn_background_tasks(state: &AppState) {
    // ── Periodic session collection ──────────────────────────────────
    let sessions = state.sessions.clone();
    let max_lifetime = state.config.sessions.gc_maxlifetime;
    let every = state.config.sessions.gc_interval_secs.max(1);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(every));
        loop {
            interval.tick().await;
            if let Err(e) = sessions.gc(max_lifetime, chrono::Utc::now()) {
                tracing::warn!(error = %e, "session collection failed");
            }
        }
    });
}
