use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use lumen_core::EngineParams;

pub(crate) fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lumen")
        .join("config.toml")
}

/// Load parameters from `path`, else the user config file, else defaults.
///
/// An explicit path must exist; the user config file is optional.
pub(crate) fn load_params(path: Option<&Path>) -> Result<EngineParams> {
    let params = match path {
        Some(path) => read_params(path)?,
        None => {
            let default_path = config_path();
            if default_path.exists() {
                read_params(&default_path)?
            } else {
                tracing::info!("No config at {}, using defaults", default_path.display());
                EngineParams::default()
            }
        }
    };

    params
        .validate()
        .context("Invalid engine parameters")?;
    Ok(params)
}

fn read_params(path: &Path) -> Result<EngineParams> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let params = parse_params(&text)
        .with_context(|| format!("Failed to parse config {}", path.display()))?;
    tracing::info!("Loaded config: {}", path.display());
    Ok(params)
}

pub(crate) fn parse_params(text: &str) -> Result<EngineParams> {
    Ok(toml::from_str(text)?)
}
