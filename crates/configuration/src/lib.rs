use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
#[cfg(feature = "clap")]
pub mod cli;
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
#[cfg(feature = "clap")]
pub use cli::ConfigArgs;
pub use logging::init_tracing;
pub use settings::{
    AnalyticsSettings, ArtifactLayout, Config, LogSettings, ServerSettings, TrackingSettings,
};

/// Name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "runscope";

/// Prefix for environment overrides, e.g. `RUNSCOPE__SERVER__PORT=8080`.
pub const ENV_PREFIX: &str = "RUNSCOPE";

/// Loads the application configuration.
///
/// Sources are layered: built-in defaults, then the TOML file, then
/// `RUNSCOPE__*` environment variables. An explicitly given file must exist;
/// the default `runscope.toml` is optional.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(
        tracking_dir = %config.tracking.root_dir.display(),
        layout_version = %config.artifacts.layout_version,
        "Configuration loaded."
    );

    Ok(config)
}
