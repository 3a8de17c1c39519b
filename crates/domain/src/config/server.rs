use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Server
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "d_3210")]
    pub port: u16,
    #[serde(default = "d_host")]
    pub host: String,
    /// Upper bound on the HTML body size the debug bar will buffer for
    /// injection.  Larger responses pass through untouched.
    #[serde(default = "d_max_inject_bytes")]
    pub max_inject_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: d_3210(),
            host: d_host(),
            max_inject_bytes: d_max_inject_bytes(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_3210() -> u16 {
    3210
}

fn d_host() -> String {
    "127.0.0.1".into()
}

fn d_max_inject_bytes() -> usize {
    4 * 1024 * 1024
}
