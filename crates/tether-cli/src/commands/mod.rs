pub mod config;
pub mod inherit;
pub mod record;

use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;
use tether_affinity::InheritanceSettings;
use tether_core::TetherConfig;
use tracing::debug;

/// Read a JSON document from disk.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

/// Engine settings from an optional `tether.toml`.
pub fn load_settings(config: Option<&Path>) -> anyhow::Result<InheritanceSettings> {
    let config = match config {
        Some(path) => {
            let config = TetherConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?;
            debug!(path = %path.display(), "config loaded");
            config
        }
        None => TetherConfig::default(),
    };
    Ok(InheritanceSettings::from(&config))
}
