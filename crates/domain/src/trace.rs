use serde::Serialize;

/// Structured trace events emitted across all session-panel crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    SessionStarted {
        session_id: String,
        is_new: bool,
    },
    SessionDestroyed {
        session_id: Option<String>,
    },
    SessionCommitted {
        session_id: String,
        keys: usize,
    },
    SessionsCollected {
        removed: usize,
        remaining: usize,
    },
    SectionRemoved {
        section: String,
        section_type: String,
    },
    SignalHandled {
        action: String,
        redirect: String,
    },
    PanelRegistered {
        panel: String,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "sp_event");
    }
}
