//! Store-backed helpers — bridges `tether_state::StateStore` to the engine.
//!
//! These are what a reconciler calls: record a binding as it happens, ask
//! whether a dependent may proceed, and compute a dependent's affinity from
//! the predecessor snapshot currently in the store.

use tether_state::{Affinity, StateStore};
use tracing::{debug, info};

use crate::error::{InheritError, InheritResult};
use crate::gate::{GateDecision, predecessor_gate};
use crate::recorder::record_placement;
use crate::settings::InheritanceSettings;
use crate::template::inherit_for_operation;

/// Record that operation `key` was bound to node `node_name` in run `run_id`.
///
/// Writes the new status with the resource version that was read, so a
/// concurrent writer surfaces as `StateError::Conflict` rather than being
/// overwritten. Returns `false` when the run was already recorded.
pub fn record_scheduled(
    store: &StateStore,
    key: &str,
    node_name: &str,
    run_id: u64,
    settings: &InheritanceSettings,
) -> InheritResult<bool> {
    let op = store
        .get_operation(key)?
        .ok_or_else(|| InheritError::OperationNotFound(key.to_string()))?;
    let node = store
        .get_node(node_name)?
        .ok_or_else(|| InheritError::NodeNotFound(node_name.to_string()))?;

    let Some(status) = record_placement(&op, &node, run_id, settings) else {
        return Ok(false);
    };
    let version = store.update_operation_status(key, op.resource_version, &status)?;
    info!(%key, node = %node_name, run_id, version, "scheduled status persisted");
    Ok(true)
}

/// Gate decision for operation `key` against the stored predecessor.
pub fn gate_for(
    store: &StateStore,
    key: &str,
    settings: &InheritanceSettings,
) -> InheritResult<GateDecision> {
    let op = store
        .get_operation(key)?
        .ok_or_else(|| InheritError::OperationNotFound(key.to_string()))?;
    let predecessor = match op.predecessor_key() {
        Some(pred_key) => store.get_operation(&pred_key)?,
        None => None,
    };
    Ok(predecessor_gate(
        &op.affinity_strategy(),
        predecessor.as_ref(),
        settings,
    ))
}

/// Final affinity for operation `key`, inheriting from the stored predecessor.
///
/// A predecessor that no longer exists contributes nothing.
pub fn inherited_affinity_for(
    store: &StateStore,
    key: &str,
    settings: &InheritanceSettings,
) -> InheritResult<Option<Affinity>> {
    let op = store
        .get_operation(key)?
        .ok_or_else(|| InheritError::OperationNotFound(key.to_string()))?;
    let predecessor = match op.predecessor_key() {
        Some(pred_key) => {
            let pred = store.get_operation(&pred_key)?;
            if pred.is_none() {
                debug!(%key, predecessor = %pred_key, "predecessor not found, nothing inherited");
            }
            pred
        }
        None => None,
    };
    Ok(inherit_for_operation(&op, predecessor.as_ref(), settings))
}
