mod debug;
mod server;
mod sessions;

pub use debug::*;
pub use server::*;
pub use sessions::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub debug: DebugConfig,
    #[serde(default)]
    pub sessions: SessionsConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.port".into(),
                message: "port must be greater than 0".into(),
            });
        }

        if self.server.host.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.host".into(),
                message: "host must not be empty".into(),
            });
        }

        if self.sessions.cookie_name.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "sessions.cookie_name".into(),
                message: "cookie name must not be empty".into(),
            });
        }

        if self.sessions.gc_maxlifetime == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "sessions.gc_maxlifetime".into(),
                message: "max lifetime must be greater than 0 seconds".into(),
            });
        }

        // The delete links are plain GETs without a token.
        if self.debug.enabled && self.server.host != "127.0.0.1" && self.server.host != "localhost"
        {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "debug.enabled".into(),
                message: format!(
                    "debug bar is enabled while listening on {}; session delete links are unauthenticated",
                    self.server.host
                ),
            });
        }

        errors
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_empty());
    }

    #[test]
    fn zero_port_is_an_error() {
        let mut cfg = Config::default();
        cfg.server.port = 0;
        let issues = cfg.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, ConfigSeverity::Error);
        assert_eq!(issues[0].field, "server.port");
    }

    #[test]
    fn public_debug_bar_warns() {
        let mut cfg = Config::default();
        cfg.debug.enabled = true;
        cfg.server.host = "0.0.0.0".into();
        let issues = cfg.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, ConfigSeverity::Warning);
        assert!(issues[0].to_string().starts_with("[WARN] debug.enabled"));
    }
}
