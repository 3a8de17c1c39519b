//! Shared HTTP session store.
//!
//! Holds the raw data of every live session keyed by session id.  When a
//! state path is configured the whole store is written through to
//! `state_path/sessions/sessions.json` on every mutation and reloaded on
//! startup.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use sp_domain::error::Result;
use sp_domain::trace::TraceEvent;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Stored session
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One session as kept by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub data: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Process-wide session store, shared behind an `Arc`.
#[derive(Default)]
pub struct SessionStore {
    sessions_path: Option<PathBuf>,
    sessions: RwLock<HashMap<String, StoredSession>>,
}

impl SessionStore {
    /// A store that never touches disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load or create the store at `state_path/sessions/sessions.json`.
    pub fn new(state_path: &Path) -> Result<Self> {
        let dir = state_path.join("sessions");
        std::fs::create_dir_all(&dir)?;

        let sessions_path = dir.join("sessions.json");
        let sessions = if sessions_path.exists() {
            let raw = std::fs::read_to_string(&sessions_path)?;
            serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(
                    error = %e,
                    path = %sessions_path.display(),
                    "discarding unreadable session file"
                );
                HashMap::new()
            })
        } else {
            HashMap::new()
        };

        tracing::info!(
            sessions = sessions.len(),
            path = %sessions_path.display(),
            "session store loaded"
        );

        Ok(Self {
            sessions_path: Some(sessions_path),
            sessions: RwLock::new(sessions),
        })
    }

    /// Whether a session with this id is stored.
    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.read().contains_key(session_id)
    }

    /// Copy of the raw data for a session.
    pub fn load(&self, session_id: &str) -> Option<Map<String, Value>> {
        self.sessions.read().get(session_id).map(|s| s.data.clone())
    }

    /// Replace the data of a session, creating it when unknown.
    pub fn save(&self, session_id: &str, data: Map<String, Value>) -> Result<()> {
        let now = Utc::now();
        {
            let mut sessions = self.sessions.write();
            sessions
                .entry(session_id.to_owned())
                .and_modify(|s| {
                    s.data = data.clone();
                    s.updated_at = now;
                })
                .or_insert_with(|| StoredSession {
                    data,
                    created_at: now,
                    updated_at: now,
                });
        }
        self.flush()
    }

    /// Drop a session.  Returns whether it existed.
    pub fn remove(&self, session_id: &str) -> Result<bool> {
        let removed = self.sessions.write().remove(session_id).is_some();
        if removed {
            self.flush()?;
        }
        Ok(removed)
    }

    /// Number of stored sessions.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    /// Collect sessions idle for longer than `max_lifetime_secs`.
    /// Returns the number of sessions removed.
    pub fn gc(&self, max_lifetime_secs: u64, now: DateTime<Utc>) -> Result<usize> {
        let (removed, remaining) = {
            let mut sessions = self.sessions.write();
            let before = sessions.len();
            sessions.retain(|_, s| {
                let idle = now.signed_duration_since(s.updated_at).num_seconds();
                idle < 0 || (idle as u64) <= max_lifetime_secs
            });
            (before - sessions.len(), sessions.len())
        };

        if removed > 0 {
            TraceEvent::SessionsCollected { removed, remaining }.emit();
            self.flush()?;
        }
        Ok(removed)
    }

    /// Persist the current state to disk.  No-op for in-memory stores.
    pub fn flush(&self) -> Result<()> {
        let Some(path) = &self.sessions_path else {
            return Ok(());
        };
        let json = {
            let sessions = self.sessions.read();
            serde_json::to_string_pretty(&*sessions)?
        };
        std::fs::write(path, json)?;
        Ok(())
    }
}
