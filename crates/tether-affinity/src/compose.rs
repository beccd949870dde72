//! Affinity composition — base affinity + inherited terms → final affinity.
//!
//! The scheduler ORs required node-selector terms, so an inherited hard
//! term is merged into every existing base term instead of being added as a
//! sibling; that keeps each base term intact and additionally requires the
//! inherited expressions. Inherited soft terms are appended after the base
//! ones. Pod (anti-)affinity passes through unchanged.

use tether_state::{Affinity, NodeSelectorTerm};
use tracing::debug;

use crate::translate::InheritedAffinity;

/// Merge an inherited fragment into a base affinity.
///
/// Neither input is modified. With no fragment the result equals the base.
pub fn compose(base: Option<&Affinity>, inherited: Option<&InheritedAffinity>) -> Option<Affinity> {
    let Some(inherited) = inherited.filter(|i| !i.is_empty()) else {
        return base.cloned();
    };

    let mut affinity = base.cloned().unwrap_or_default();
    let node_affinity = affinity.node_affinity.get_or_insert_with(Default::default);

    if let Some(term) = &inherited.required {
        let selector = node_affinity
            .required_during_scheduling_ignored_during_execution
            .get_or_insert_with(Default::default);
        if selector.node_selector_terms.is_empty() {
            selector.node_selector_terms.push(term.clone());
        } else {
            for existing in &mut selector.node_selector_terms {
                merge_term(existing, term);
            }
        }
    }

    node_affinity
        .preferred_during_scheduling_ignored_during_execution
        .extend(inherited.preferred.iter().cloned());

    debug!(
        required = inherited.required.is_some(),
        preferred = inherited.preferred.len(),
        "inherited affinity composed"
    );
    Some(affinity)
}

/// AND the inherited expressions into an existing term.
fn merge_term(existing: &mut NodeSelectorTerm, inherited: &NodeSelectorTerm) {
    for expression in &inherited.match_expressions {
        if !existing.match_expressions.contains(expression) {
            existing.match_expressions.push(expression.clone());
        }
    }
}
