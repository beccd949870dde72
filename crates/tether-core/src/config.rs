//! tether.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};
use crate::labels::{MAX_PREFER_WEIGHT, MIN_PREFER_WEIGHT, TopologyKeys};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TetherConfig {
    pub labels: Option<LabelsConfig>,
    pub prefer: Option<PreferConfig>,
}

/// Overrides for the topology label keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelsConfig {
    pub host: Option<String>,
    pub zone: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreferConfig {
    /// Weight used for the implicit `{host, weight}` preference.
    pub default_weight: Option<i32>,
}

impl TetherConfig {
    /// Read and validate a config file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate config text.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: TetherConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.topology_keys().validate()?;
        let weight = self.default_prefer_weight();
        if !(MIN_PREFER_WEIGHT..=MAX_PREFER_WEIGHT).contains(&weight) {
            return Err(ConfigError::InvalidWeight(weight));
        }
        Ok(())
    }

    /// Topology keys with any configured overrides applied.
    pub fn topology_keys(&self) -> TopologyKeys {
        let mut keys = TopologyKeys::default();
        if let Some(labels) = &self.labels {
            if let Some(host) = &labels.host {
                keys.host = host.clone();
            }
            if let Some(zone) = &labels.zone {
                keys.zone = zone.clone();
            }
            if let Some(region) = &labels.region {
                keys.region = region.clone();
            }
        }
        keys
    }

    pub fn default_prefer_weight(&self) -> i32 {
        self.prefer
            .as_ref()
            .and_then(|p| p.default_weight)
            .unwrap_or(MAX_PREFER_WEIGHT)
    }

    /// Scaffold a config spelling out the built-in defaults.
    pub fn scaffold() -> Self {
        let keys = TopologyKeys::default();
        TetherConfig {
            labels: Some(LabelsConfig {
                host: Some(keys.host),
                zone: Some(keys.zone),
                region: Some(keys.region),
            }),
            prefer: Some(PreferConfig {
                default_weight: Some(MAX_PREFER_WEIGHT),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_platform_defaults() {
        let config = TetherConfig::from_toml_str("").unwrap();
        assert_eq!(config.topology_keys(), TopologyKeys::default());
        assert_eq!(config.default_prefer_weight(), 100);
    }

    #[test]
    fn overrides_single_key() {
        let config = TetherConfig::from_toml_str(
            r#"
[labels]
host = "example.com/node"
"#,
        )
        .unwrap();
        let keys = config.topology_keys();
        assert_eq!(keys.host, "example.com/node");
        assert_eq!(keys.zone, "topology.kubernetes.io/zone");
    }

    #[test]
    fn rejects_invalid_label_key() {
        let err = TetherConfig::from_toml_str(
            r#"
[labels]
zone = "not a key"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLabelKey { .. }));
    }

    #[test]
    fn rejects_out_of_range_weight() {
        for weight in [0, -5, 101] {
            let text = format!("[prefer]\ndefault_weight = {weight}\n");
            let err = TetherConfig::from_toml_str(&text).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidWeight(w) if w == weight));
        }
    }

    #[test]
    fn scaffold_round_trips_through_toml() {
        let config = TetherConfig::scaffold();
        let text = config.to_toml_string().unwrap();
        assert!(text.contains("kubernetes.io/hostname"));
        assert_eq!(TetherConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn from_file_reads_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tether.toml");
        std::fs::write(&path, "[prefer]\ndefault_weight = 40\n").unwrap();

        let config = TetherConfig::from_file(&path).unwrap();
        assert_eq!(config.default_prefer_weight(), 40);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = TetherConfig::from_file(Path::new("/nonexistent/tether.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
