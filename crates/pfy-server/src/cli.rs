use std::path::PathBuf;

use clap::Parser;
use pfy_config::PfyConfig;

/// Command-line flags for the `projectify` binary.
#[derive(Debug, Parser)]
#[command(name = "projectify", version, about = "Projectify task and notification server")]
pub struct Cli {
    /// Extra TOML config layered above projectify.toml
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Listen address, overrides server.bind
    #[arg(long)]
    pub bind: Option<String>,

    /// Database path or :memory:, overrides database.path
    #[arg(long)]
    pub db: Option<String>,

    /// Do not start the due-date sweeper
    #[arg(long)]
    pub no_sweeper: bool,

    /// Quiet mode (warnings and errors only)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Apply flag overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut PfyConfig) {
        if let Some(bind) = &self.bind {
            config.server.bind.clone_from(bind);
        }
        if let Some(db) = &self.db {
            config.database.path.clone_from(db);
        }
        if self.no_sweeper {
            config.sweeper.enabled = false;
        }
    }

    pub const fn log_level(&self) -> &'static str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}
