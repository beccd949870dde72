//! Placement recording — what did the node an operation landed on look like?
//!
//! Facts are the node's host/zone/region labels plus every label the
//! operation's own node affinity mentions, each only when the node actually
//! carries it. Distributed (multi-pod) operations never record facts.

use tether_state::{
    Affinity, NodeInfo, Operation, OperationPhase, OperationStatus, PlacementFacts,
};
use tracing::{debug, info};

use crate::settings::InheritanceSettings;

/// Label keys referenced by the node-affinity expressions of `affinity`,
/// required terms first, in declaration order and without duplicates.
pub fn declared_label_keys(affinity: Option<&Affinity>) -> Vec<&str> {
    let Some(node_affinity) = affinity.and_then(|a| a.node_affinity.as_ref()) else {
        return Vec::new();
    };

    let required = node_affinity
        .required_during_scheduling_ignored_during_execution
        .iter()
        .flat_map(|selector| &selector.node_selector_terms);
    let preferred = node_affinity
        .preferred_during_scheduling_ignored_during_execution
        .iter()
        .map(|term| &term.preference);

    let mut keys: Vec<&str> = Vec::new();
    for term in required.chain(preferred) {
        for expression in &term.match_expressions {
            if !keys.contains(&expression.key.as_str()) {
                keys.push(&expression.key);
            }
        }
    }
    keys
}

/// Capture the placement facts of `op` running on `node`.
///
/// Returns `None` for multi-pod operations.
pub fn capture_placement(
    op: &Operation,
    node: &NodeInfo,
    settings: &InheritanceSettings,
) -> Option<PlacementFacts> {
    if !op.is_single_pod() {
        return None;
    }

    let declared = declared_label_keys(op.spec.affinity.as_ref());
    let facts: PlacementFacts = settings
        .keys
        .iter()
        .chain(declared)
        .filter_map(|key| {
            node.labels
                .get(key)
                .map(|value| (key.to_string(), value.clone()))
        })
        .collect();
    Some(facts)
}

/// Compute the status for `op` having been bound to `node` in run `run_id`.
///
/// Returns `None` when there is nothing to write: the run was already
/// recorded, or `run_id` belongs to an earlier run. A newer run replaces the
/// whole status, so facts from a previous attempt never survive.
pub fn record_placement(
    op: &Operation,
    node: &NodeInfo,
    run_id: u64,
    settings: &InheritanceSettings,
) -> Option<OperationStatus> {
    let current = &op.status;
    if run_id < current.run_id || (run_id == current.run_id && current.phase.is_scheduled()) {
        debug!(
            operation = %op.table_key(),
            run_id,
            recorded_run = current.run_id,
            "placement already recorded for this run"
        );
        return None;
    }

    let status = if op.is_single_pod() {
        OperationStatus {
            phase: OperationPhase::Scheduled,
            run_id,
            node_name: Some(node.name.clone()),
            node_affinity_labels: capture_placement(op, node, settings),
        }
    } else {
        OperationStatus {
            phase: OperationPhase::Scheduled,
            run_id,
            node_name: None,
            node_affinity_labels: None,
        }
    };

    info!(
        operation = %op.table_key(),
        node = %node.name,
        run_id,
        labels = status.node_affinity_labels.as_ref().map_or(0, |f| f.len()),
        "placement recorded"
    );
    Some(status)
}
