use anyhow::Context;
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use tracing::{error, info};
use waypath_navigation::LayoutConfig;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Top-level settings of the `waypath` binary.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub layout: LayoutConfig,
}

/// Loads settings from an optional TOML file, overridden by `WAYPATH_*`
/// environment variables (`WAYPATH_LAYOUT__SEED=42`).
pub fn load_settings(path: &str) -> anyhow::Result<Settings> {
    info!("Attempting to load configuration from {}", path);

    let settings = Config::builder()
        .add_source(File::new(path, FileFormat::Toml).required(false))
        .add_source(
            Environment::with_prefix("WAYPATH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .and_then(|config| config.try_deserialize::<Settings>());

    match settings {
        Ok(settings) => {
            info!("Successfully loaded configuration: {:?}", settings);
            Ok(settings)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            Err(e).with_context(|| format!("could not read settings from {}", path))
        }
    }
}
