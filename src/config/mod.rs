mod types;

pub use types::*;

use crate::{Error, Result};
use std::env;
use std::path::Path;
use tracing::debug;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

pub async fn load() -> Result<Config> {
    let explicit = env::var("CONFIG_PATH").ok();
    let config_path = explicit
        .clone()
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let mut config = if explicit.is_none() && !Path::new(&config_path).exists() {
        debug!("No {} found, using built-in defaults", config_path);
        Config::default()
    } else {
        debug!("Loading configuration from: {}", config_path);
        from_file(&config_path).await?
    };

    apply_env_overrides(&mut config)?;
    Ok(config)
}

pub async fn from_file(path: impl AsRef<Path>) -> Result<Config> {
    let config_str = tokio::fs::read_to_string(path.as_ref()).await?;
    parse(&config_str)
}

pub fn parse(config_str: &str) -> Result<Config> {
    // An empty document deserializes to unit, not to an empty mapping.
    if config_str.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(serde_yaml::from_str(config_str)?)
}

fn apply_env_overrides(config: &mut Config) -> Result<()> {
    if let Ok(host) = env::var("MOLSTRUCT_HOST") {
        config.server.host = host;
    }
    if let Ok(port) = env::var("MOLSTRUCT_PORT") {
        config.server.port = port
            .parse()
            .map_err(|_| Error::config(format!("Invalid MOLSTRUCT_PORT: '{}'", port)))?;
    }
    Ok(())
}
