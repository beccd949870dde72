//! Constraint translation — (canonical strategy, predecessor facts) → terms.
//!
//! `Require` yields one hard term whose expressions must all hold on the
//! same node. `Prefer` yields one soft term per resolved label, so each
//! weight is scored independently. Labels the predecessor has no fact for
//! are dropped; if nothing resolves, no fragment is produced at all.

use tether_state::{
    AffinityPolicy, AffinityStrategy, NodeSelectorRequirement, NodeSelectorTerm, PlacementFacts,
    PreferredSchedulingTerm,
};
use tracing::debug;

/// Node-affinity terms inherited from a predecessor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InheritedAffinity {
    /// Hard term; every expression must match.
    pub required: Option<NodeSelectorTerm>,
    /// Independent weighted soft terms.
    pub preferred: Vec<PreferredSchedulingTerm>,
}

impl InheritedAffinity {
    pub fn is_empty(&self) -> bool {
        self.required.is_none() && self.preferred.is_empty()
    }
}

/// Translate a canonical strategy and the predecessor's facts into terms.
///
/// `facts` is `None` when the predecessor has not been scheduled yet, has
/// no recorded facts (multi-pod), or no longer exists.
pub fn translate(
    strategy: &AffinityStrategy,
    facts: Option<&PlacementFacts>,
) -> Option<InheritedAffinity> {
    let facts = match facts {
        Some(facts) if !facts.is_empty() => facts,
        _ => {
            if !matches!(strategy.policy, AffinityPolicy::None) {
                debug!(policy = %strategy.policy, "predecessor has no placement facts");
            }
            return None;
        }
    };

    let inherited = match strategy.policy {
        AffinityPolicy::Require => InheritedAffinity {
            required: required_term(&strategy.require, facts),
            preferred: Vec::new(),
        },
        AffinityPolicy::Prefer => InheritedAffinity {
            required: None,
            preferred: preferred_terms(strategy, facts),
        },
        AffinityPolicy::None | AffinityPolicy::Unrecognized(_) => return None,
    };

    (!inherited.is_empty()).then_some(inherited)
}

fn required_term(names: &[String], facts: &PlacementFacts) -> Option<NodeSelectorTerm> {
    let mut expressions: Vec<NodeSelectorRequirement> = Vec::with_capacity(names.len());
    for name in names {
        if expressions.iter().any(|e| &e.key == name) {
            continue;
        }
        match facts.get(name) {
            Some(value) => expressions.push(NodeSelectorRequirement::equals(name, value)),
            None => debug!(label = %name, "required label not recorded for predecessor, dropped"),
        }
    }

    if expressions.is_empty() {
        return None;
    }
    Some(NodeSelectorTerm {
        match_expressions: expressions,
        match_fields: Vec::new(),
    })
}

fn preferred_terms(strategy: &AffinityStrategy, facts: &PlacementFacts) -> Vec<PreferredSchedulingTerm> {
    let mut terms: Vec<PreferredSchedulingTerm> = Vec::with_capacity(strategy.prefer.len());
    for label in &strategy.prefer {
        if label.weight <= 0 {
            continue;
        }
        let Some(value) = facts.get(&label.name) else {
            debug!(label = %label.name, "preferred label not recorded for predecessor, dropped");
            continue;
        };
        let duplicate = terms
            .iter()
            .any(|t| t.preference.match_expressions.iter().any(|e| e.key == label.name));
        if duplicate {
            continue;
        }
        terms.push(PreferredSchedulingTerm {
            weight: label.weight,
            preference: NodeSelectorTerm {
                match_expressions: vec![NodeSelectorRequirement::equals(&label.name, value)],
                match_fields: Vec::new(),
            },
        });
    }
    terms
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_state::PreferLabel;

    fn facts(pairs: &[(&str, &str)]) -> PlacementFacts {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn require(names: &[&str]) -> AffinityStrategy {
        AffinityStrategy {
            policy: AffinityPolicy::Require,
            require: names.iter().map(|n| n.to_string()).collect(),
            prefer: vec![],
        }
    }

    fn prefer(labels: &[(&str, i32)]) -> AffinityStrategy {
        AffinityStrategy {
            policy: AffinityPolicy::Prefer,
            require: vec![],
            prefer: labels.iter().map(|(n, w)| PreferLabel::new(*n, *w)).collect(),
        }
    }

    #[test]
    fn none_policy_yields_nothing() {
        let f = facts(&[("host", "n1")]);
        assert!(translate(&AffinityStrategy::default(), Some(&f)).is_none());
    }

    #[test]
    fn missing_or_empty_facts_yield_nothing() {
        assert!(translate(&require(&["host"]), None).is_none());
        assert!(translate(&require(&["host"]), Some(&PlacementFacts::new())).is_none());
        assert!(translate(&prefer(&[("host", 100)]), Some(&PlacementFacts::new())).is_none());
    }

    #[test]
    fn require_combines_resolved_labels_in_one_term() {
        let f = facts(&[("host", "n1"), ("zone", "z1")]);
        let out = translate(&require(&["host", "zone"]), Some(&f)).unwrap();

        let term = out.required.unwrap();
        assert_eq!(
            term.match_expressions,
            vec![
                NodeSelectorRequirement::equals("host", "n1"),
                NodeSelectorRequirement::equals("zone", "z1"),
            ]
        );
        assert!(out.preferred.is_empty());
    }

    #[test]
    fn require_drops_unrecorded_labels() {
        let f = facts(&[("host", "n1"), ("zone", "z1")]);
        let out = translate(&require(&["region", "host"]), Some(&f)).unwrap();
        assert_eq!(
            out.required.unwrap().match_expressions,
            vec![NodeSelectorRequirement::equals("host", "n1")]
        );
    }

    #[test]
    fn require_with_nothing_resolved_yields_nothing() {
        let f = facts(&[("host", "n1")]);
        assert!(translate(&require(&["region", "rack"]), Some(&f)).is_none());
    }

    #[test]
    fn prefer_emits_independent_terms() {
        let f = facts(&[("zone", "z1"), ("region", "r1")]);
        let out = translate(&prefer(&[("zone", 100), ("region", 50)]), Some(&f)).unwrap();

        assert!(out.required.is_none());
        assert_eq!(out.preferred.len(), 2);
        assert_eq!(out.preferred[0].weight, 100);
        assert_eq!(
            out.preferred[0].preference.match_expressions,
            vec![NodeSelectorRequirement::equals("zone", "z1")]
        );
        assert_eq!(out.preferred[1].weight, 50);
        assert_eq!(
            out.preferred[1].preference.match_expressions,
            vec![NodeSelectorRequirement::equals("region", "r1")]
        );
    }

    #[test]
    fn prefer_drops_unrecorded_labels() {
        let f = facts(&[("zone", "z1")]);
        let out = translate(&prefer(&[("host", 100), ("zone", 30)]), Some(&f)).unwrap();
        assert_eq!(out.preferred.len(), 1);
        assert_eq!(out.preferred[0].weight, 30);
    }

    #[test]
    fn prefer_with_nothing_resolved_yields_nothing() {
        let f = facts(&[("zone", "z1")]);
        assert!(translate(&prefer(&[("host", 100)]), Some(&f)).is_none());
    }

    #[test]
    fn prefer_never_emits_non_positive_weight() {
        let f = facts(&[("zone", "z1"), ("host", "n1")]);
        let out = translate(&prefer(&[("zone", 0), ("host", 10)]), Some(&f)).unwrap();
        assert_eq!(out.preferred.len(), 1);
        assert!(out.preferred.iter().all(|t| t.weight > 0));
    }

    #[test]
    fn unrecognized_policy_yields_nothing() {
        let f = facts(&[("host", "n1")]);
        let mut strategy = require(&["host"]);
        strategy.policy = AffinityPolicy::Unrecognized("Maybe".to_string());
        assert!(translate(&strategy, Some(&f)).is_none());
    }
}
