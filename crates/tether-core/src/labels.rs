//! Well-known node topology labels.
//!
//! Placement facts are recorded under these keys, and the inheritance
//! defaults (`require = [host]`, `prefer = [{host, 100}]`) refer to the host
//! key. Deployments on platforms with non-standard labels can override all
//! three through `tether.toml`.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Per-node unique label ("hostname").
pub const HOSTNAME_LABEL: &str = "kubernetes.io/hostname";

/// Failure-domain zone label.
pub const ZONE_LABEL: &str = "topology.kubernetes.io/zone";

/// Failure-domain region label.
pub const REGION_LABEL: &str = "topology.kubernetes.io/region";

/// Lowest weight the scheduler accepts for a preferred term.
pub const MIN_PREFER_WEIGHT: i32 = 1;

/// Highest weight the scheduler accepts for a preferred term.
pub const MAX_PREFER_WEIGHT: i32 = 100;

const MAX_NAME_LEN: usize = 63;
const MAX_PREFIX_LEN: usize = 253;

/// The three topology label keys recorded for every scheduled operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyKeys {
    pub host: String,
    pub zone: String,
    pub region: String,
}

impl Default for TopologyKeys {
    fn default() -> Self {
        Self {
            host: HOSTNAME_LABEL.to_string(),
            zone: ZONE_LABEL.to_string(),
            region: REGION_LABEL.to_string(),
        }
    }
}

impl TopologyKeys {
    /// Keys in recording order: host, zone, region.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        [self.host.as_str(), self.zone.as_str(), self.region.as_str()].into_iter()
    }

    /// Check that every key is a well-formed label key.
    pub fn validate(&self) -> ConfigResult<()> {
        for key in self.iter() {
            validate_label_key(key)?;
        }
        Ok(())
    }
}

/// Validate a label key: an optional DNS-subdomain prefix and `/`, followed
/// by a name of at most 63 alphanumeric, `-`, `_` or `.` characters that
/// starts and ends with an alphanumeric.
pub fn validate_label_key(key: &str) -> ConfigResult<()> {
    let invalid = |reason: &str| ConfigError::InvalidLabelKey {
        key: key.to_string(),
        reason: reason.to_string(),
    };

    let (prefix, name) = match key.split_once('/') {
        Some((prefix, name)) => (Some(prefix), name),
        None => (None, key),
    };

    let name_re = Regex::new(r"^[A-Za-z0-9]([-A-Za-z0-9_.]*[A-Za-z0-9])?$")?;
    if name.is_empty() {
        return Err(invalid("name part must not be empty"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(invalid("name part must be no more than 63 characters"));
    }
    if !name_re.is_match(name) {
        return Err(invalid(
            "name part must consist of alphanumerics, '-', '_' or '.', and start and end with an alphanumeric",
        ));
    }

    if let Some(prefix) = prefix {
        let prefix_re =
            Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$")?;
        if prefix.is_empty() {
            return Err(invalid("prefix part must not be empty"));
        }
        if prefix.len() > MAX_PREFIX_LEN {
            return Err(invalid("prefix part must be no more than 253 characters"));
        }
        if !prefix_re.is_match(prefix) {
            return Err(invalid("prefix part must be a lowercase DNS subdomain"));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_well_known_keys() {
        let keys = TopologyKeys::default();
        assert_eq!(keys.host, "kubernetes.io/hostname");
        assert_eq!(keys.zone, "topology.kubernetes.io/zone");
        assert_eq!(keys.region, "topology.kubernetes.io/region");
        assert!(keys.validate().is_ok());
    }

    #[test]
    fn iter_yields_host_zone_region() {
        let keys = TopologyKeys::default();
        let order: Vec<&str> = keys.iter().collect();
        assert_eq!(order, vec![HOSTNAME_LABEL, ZONE_LABEL, REGION_LABEL]);
    }

    #[test]
    fn accepts_unprefixed_and_prefixed_keys() {
        assert!(validate_label_key("gpu").is_ok());
        assert!(validate_label_key("node.example.com/rack_id").is_ok());
        assert!(validate_label_key("a.b-c/D.e-f_9").is_ok());
    }

    #[test]
    fn rejects_malformed_keys() {
        assert!(validate_label_key("").is_err());
        assert!(validate_label_key("-leading-dash").is_err());
        assert!(validate_label_key("example.com/").is_err());
        assert!(validate_label_key("/name").is_err());
        assert!(validate_label_key("Upper.Case/name").is_err());
        assert!(validate_label_key("a/b/c").is_err());
        assert!(validate_label_key(&"x".repeat(64)).is_err());
    }

    #[test]
    fn error_names_the_key() {
        let err = validate_label_key("bad key").unwrap_err();
        assert!(err.to_string().contains("bad key"));
    }
}
