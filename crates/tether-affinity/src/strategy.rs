//! Strategy resolution — declared strategy → canonical strategy.
//!
//! Canonical means:
//! - the policy is one of `None`, `Require`, `Prefer`;
//! - only the list belonging to the policy is kept;
//! - list entries are non-empty, unique by label name (first wins), and
//!   prefer weights lie in `1..=100`;
//! - an empty declared list is replaced by the host-label default.
//!
//! A declared list whose entries are all malformed disables inheritance
//! rather than falling back to the default.
//!
//! Resolution never fails and is idempotent. The declared strategy is only
//! borrowed; defaults never flow back into the spec.

use std::collections::HashSet;

use tether_core::{MAX_PREFER_WEIGHT, MIN_PREFER_WEIGHT};
use tether_state::{AffinityPolicy, AffinityStrategy, PreferLabel};
use tracing::{debug, warn};

use crate::settings::InheritanceSettings;

/// Resolve a declared strategy into canonical form.
pub fn resolve(raw: &AffinityStrategy, settings: &InheritanceSettings) -> AffinityStrategy {
    match &raw.policy {
        AffinityPolicy::None => AffinityStrategy::default(),
        AffinityPolicy::Unrecognized(value) => {
            warn!(policy = %value, "unrecognized affinity policy, inheritance disabled");
            AffinityStrategy::default()
        }
        AffinityPolicy::Require => match resolve_require(&raw.require, settings) {
            Some(require) => AffinityStrategy {
                policy: AffinityPolicy::Require,
                require,
                prefer: Vec::new(),
            },
            None => disabled(&raw.policy),
        },
        AffinityPolicy::Prefer => match resolve_prefer(&raw.prefer, settings) {
            Some(prefer) => AffinityStrategy {
                policy: AffinityPolicy::Prefer,
                require: Vec::new(),
                prefer,
            },
            None => disabled(&raw.policy),
        },
    }
}

fn disabled(policy: &AffinityPolicy) -> AffinityStrategy {
    warn!(%policy, "no usable label in declared list, inheritance disabled");
    AffinityStrategy::default()
}

/// `None` when a non-empty declared list has no usable entry.
fn resolve_require(names: &[String], settings: &InheritanceSettings) -> Option<Vec<String>> {
    if names.is_empty() {
        return Some(vec![settings.keys.host.clone()]);
    }

    let mut seen = HashSet::new();
    let resolved: Vec<String> = names
        .iter()
        .filter(|name| !name.is_empty() && seen.insert(name.as_str()))
        .cloned()
        .collect();
    (!resolved.is_empty()).then_some(resolved)
}

fn resolve_prefer(
    labels: &[PreferLabel],
    settings: &InheritanceSettings,
) -> Option<Vec<PreferLabel>> {
    if labels.is_empty() {
        return Some(vec![PreferLabel::new(
            settings.keys.host.clone(),
            settings.default_prefer_weight,
        )]);
    }

    let mut seen = HashSet::new();
    let mut resolved = Vec::with_capacity(labels.len());

    for label in labels {
        if label.name.is_empty() {
            continue;
        }
        let weight = match clamp_weight(label) {
            Some(weight) => weight,
            None => continue,
        };
        if !seen.insert(label.name.as_str()) {
            debug!(label = %label.name, "duplicate prefer label ignored");
            continue;
        }
        resolved.push(PreferLabel::new(label.name.clone(), weight));
    }
    (!resolved.is_empty()).then_some(resolved)
}

/// Non-positive weights drop the entry; weights above the scheduler's
/// maximum are clamped to it.
fn clamp_weight(label: &PreferLabel) -> Option<i32> {
    if label.weight < MIN_PREFER_WEIGHT {
        warn!(label = %label.name, weight = label.weight, "non-positive prefer weight, entry dropped");
        return None;
    }
    if label.weight > MAX_PREFER_WEIGHT {
        warn!(
            label = %label.name,
            weight = label.weight,
            clamped = MAX_PREFER_WEIGHT,
            "prefer weight above maximum, clamped"
        );
        return Some(MAX_PREFER_WEIGHT);
    }
    Some(label.weight)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOST: &str = "kubernetes.io/hostname";
    const ZONE: &str = "topology.kubernetes.io/zone";

    fn strategy(policy: AffinityPolicy) -> AffinityStrategy {
        AffinityStrategy {
            policy,
            ..Default::default()
        }
    }

    #[test]
    fn none_stays_none() {
        let mut raw = strategy(AffinityPolicy::None);
        raw.require = vec![ZONE.to_string()];
        let resolved = resolve(&raw, &InheritanceSettings::default());
        assert_eq!(resolved, AffinityStrategy::default());
    }

    #[test]
    fn unrecognized_policy_degrades_to_none() {
        let raw = strategy(AffinityPolicy::Unrecognized("Always".to_string()));
        let resolved = resolve(&raw, &InheritanceSettings::default());
        assert_eq!(resolved.policy, AffinityPolicy::None);
    }

    #[test]
    fn require_defaults_to_host() {
        let resolved = resolve(&strategy(AffinityPolicy::Require), &InheritanceSettings::default());
        assert_eq!(resolved.require, vec![HOST.to_string()]);
        assert!(resolved.prefer.is_empty());
    }

    #[test]
    fn require_keeps_order_and_drops_duplicates() {
        let mut raw = strategy(AffinityPolicy::Require);
        raw.require = vec![ZONE.into(), HOST.into(), ZONE.into(), String::new()];
        let resolved = resolve(&raw, &InheritanceSettings::default());
        assert_eq!(resolved.require, vec![ZONE.to_string(), HOST.to_string()]);
    }

    #[test]
    fn prefer_defaults_to_host_with_configured_weight() {
        let settings = InheritanceSettings {
            default_prefer_weight: 60,
            ..Default::default()
        };
        let resolved = resolve(&strategy(AffinityPolicy::Prefer), &settings);
        assert_eq!(resolved.prefer, vec![PreferLabel::new(HOST, 60)]);
        assert!(resolved.require.is_empty());
    }

    #[test]
    fn prefer_weights_are_dropped_or_clamped() {
        let mut raw = strategy(AffinityPolicy::Prefer);
        raw.prefer = vec![
            PreferLabel::new(ZONE, 0),
            PreferLabel::new("rack", -3),
            PreferLabel::new(HOST, 250),
            PreferLabel::new("disk", 40),
        ];
        let resolved = resolve(&raw, &InheritanceSettings::default());
        assert_eq!(
            resolved.prefer,
            vec![PreferLabel::new(HOST, 100), PreferLabel::new("disk", 40)]
        );
    }

    #[test]
    fn prefer_all_invalid_disables_inheritance() {
        let mut raw = strategy(AffinityPolicy::Prefer);
        raw.prefer = vec![PreferLabel::new(ZONE, 0), PreferLabel::new(String::new(), 10)];
        let resolved = resolve(&raw, &InheritanceSettings::default());
        assert_eq!(resolved, AffinityStrategy::default());
    }

    #[test]
    fn require_all_empty_names_disables_inheritance() {
        let mut raw = strategy(AffinityPolicy::Require);
        raw.require = vec![String::new(), String::new()];
        let settings = InheritanceSettings::default();
        let resolved = resolve(&raw, &settings);
        assert_eq!(resolved, AffinityStrategy::default());
        assert_eq!(resolve(&resolved, &settings), resolved);
    }

    #[test]
    fn resolution_is_idempotent() {
        let settings = InheritanceSettings::default();
        let mut raw = strategy(AffinityPolicy::Prefer);
        raw.prefer = vec![PreferLabel::new(ZONE, 500), PreferLabel::new(ZONE, 20)];
        raw.require = vec![HOST.to_string()];

        let once = resolve(&raw, &settings);
        let twice = resolve(&once, &settings);
        assert_eq!(once, twice);
    }

    #[test]
    fn declared_strategy_is_untouched() {
        let raw = strategy(AffinityPolicy::Require);
        let before = raw.clone();
        let _ = resolve(&raw, &InheritanceSettings::default());
        assert_eq!(raw, before);
    }
}
