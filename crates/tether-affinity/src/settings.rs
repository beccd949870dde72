//! Engine settings derived from `tether.toml`.

use tether_core::{MAX_PREFER_WEIGHT, TetherConfig, TopologyKeys};

/// Label keys and defaults shared by the recorder and the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InheritanceSettings {
    pub keys: TopologyKeys,
    /// Weight of the implicit host preference when `prefer` is empty.
    pub default_prefer_weight: i32,
}

impl Default for InheritanceSettings {
    fn default() -> Self {
        Self {
            keys: TopologyKeys::default(),
            default_prefer_weight: MAX_PREFER_WEIGHT,
        }
    }
}

impl From<&TetherConfig> for InheritanceSettings {
    fn from(config: &TetherConfig) -> Self {
        Self {
            keys: config.topology_keys(),
            default_prefer_weight: config.default_prefer_weight(),
        }
    }
}
