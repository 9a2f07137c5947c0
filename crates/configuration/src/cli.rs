use crate::error::ConfigError;
use crate::settings::Config;
use std::path::PathBuf;

/// Command-line flags shared by every subcommand that needs configuration.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ConfigArgs {
    /// Path to a TOML configuration file (defaults to `runscope.toml` if present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Overrides `tracking.root_dir` from the configuration.
    #[arg(long, global = true)]
    pub tracking_dir: Option<PathBuf>,
}

impl ConfigArgs {
    /// Loads the configuration and applies the command-line overrides on top.
    pub fn load(&self) -> Result<Config, ConfigError> {
        let mut config = crate::load_config(self.config.as_deref())?;
        if let Some(dir) = &self.tracking_dir {
            config.tracking.root_dir = dir.clone();
        }
        Ok(config)
    }
}
