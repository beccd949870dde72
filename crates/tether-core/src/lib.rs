//! tether-core — shared configuration and well-known label keys.
//!
//! Everything here is consumed by the affinity engine and the CLI: the
//! topology label keys that placement facts are recorded under,
//! and the `tether.toml` file that can override them.

pub mod config;
pub mod error;
pub mod labels;

pub use config::TetherConfig;
pub use error::{ConfigError, ConfigResult};
pub use labels::{MAX_PREFER_WEIGHT, MIN_PREFER_WEIGHT, TopologyKeys, validate_label_key};
