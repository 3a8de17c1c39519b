pub mod config;

use clap::{Parser, Subcommand};

/// Demo web app with a session debug panel.
#[derive(Debug, Parser)]
#[command(name = "session-panel", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the server (default when no subcommand is given).
    Serve,
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path in `SP_CONFIG` (or `config.toml`).
/// A missing file yields the defaults.  Returns the parsed [`Config`] and
/// the path that was used.
///
/// [`Config`]: sp_domain::config::Config
pub fn load_config() -> anyhow::Result<(sp_domain::config::Config, String)> {
    let config_path = std::env::var("SP_CONFIG").unwrap_or_else(|_| "config.toml".into());
    let config = load_config_from(&config_path)?;
    Ok((config, config_path))
}

pub fn load_config_from(config_path: &str) -> anyhow::Result<sp_domain::config::Config> {
    if !std::path::Path::new(config_path).exists() {
        return Ok(sp_domain::config::Config::default());
    }
    let raw = std::fs::read_to_string(config_path)
        .map_err(|e| anyhow::anyhow!("reading {config_path}: {e}"))?;
    toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {config_path}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let cfg = load_config_from("/nonexistent/session-panel.toml").unwrap();
        assert!(!cfg.debug.enabled);
    }

    #[test]
    fn parse_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[debug]\nenabled = \"yes\"\n").unwrap();

        let err = load_config_from(path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().starts_with("parsing "));
    }

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::parse_from(["session-panel", "config", "validate"]);
        assert!(matches!(cli.command, Some(Command::Config(ConfigCommand::Validate))));
        let cli = Cli::parse_from(["session-panel"]);
        assert!(cli.command.is_none());
    }
}
