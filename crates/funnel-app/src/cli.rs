//! CLI argument definitions for the funnel binary.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Funnel: replay landing-page sessions through the tracking stack.
#[derive(Parser, Debug)]
#[command(name = "funnel", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay a JSON-lines script of host events against one page session.
    Replay(ReplayArgs),
    /// Print the default configuration as TOML.
    DefaultConfig,
}

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Script file: one `{"at_ms": .., "event": {..}}` object per line.
    pub script: PathBuf,

    /// URL of the page being replayed.
    #[arg(long = "url", default_value = "https://localhost/")]
    pub url: String,

    /// Page title.
    #[arg(long = "title", default_value = "")]
    pub title: String,

    /// Referrer of the page view.
    #[arg(long = "referrer", default_value = "")]
    pub referrer: String,

    /// The page has a mobile menu.
    #[arg(long = "menu")]
    pub menu: bool,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > FUNNEL_CONFIG env var > ./funnel.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("FUNNEL_CONFIG") {
            return PathBuf::from(p);
        }
        PathBuf::from("funnel.toml")
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }
}
