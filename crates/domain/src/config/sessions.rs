use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Sessions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// HTTP session store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// Name of the cookie carrying the session id.
    #[serde(default = "d_cookie_name")]
    pub cookie_name: String,

    /// Seconds of inactivity after which a stored session is collected.
    #[serde(default = "d_gc_maxlifetime")]
    pub gc_maxlifetime: u64,

    /// How often the background collector runs, in seconds.
    #[serde(default = "d_gc_interval")]
    pub gc_interval_secs: u64,

    /// Directory for `sessions/sessions.json`.  When `None` sessions live in
    /// memory only.
    #[serde(default)]
    pub state_path: Option<PathBuf>,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            cookie_name: d_cookie_name(),
            gc_maxlifetime: d_gc_maxlifetime(),
            gc_interval_secs: d_gc_interval(),
            state_path: None,
        }
    }
}

fn d_cookie_name() -> String {
    "SESSID".into()
}

fn d_gc_maxlifetime() -> u64 {
    1440
}

fn d_gc_interval() -> u64 {
    60
}
