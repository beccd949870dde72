//! Ordering gate between a dependent operation and its predecessor.
//!
//! The reconciler owns requeueing; this only answers whether the
//! predecessor's status is settled enough for the dependent's pod template
//! to be rendered.

use tether_state::{AffinityPolicy, AffinityStrategy, Operation};

use crate::settings::InheritanceSettings;
use crate::strategy::resolve;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Render the template now.
    Ready,
    /// Requeue: the predecessor has not been scheduled yet.
    Wait,
}

/// Decide whether a dependent with `strategy` may render its template.
///
/// Without inheritance the predecessor is irrelevant. A missing predecessor
/// or a multi-pod one can never contribute facts, so neither blocks.
pub fn predecessor_gate(
    strategy: &AffinityStrategy,
    predecessor: Option<&Operation>,
    settings: &InheritanceSettings,
) -> GateDecision {
    if resolve(strategy, settings).policy == AffinityPolicy::None {
        return GateDecision::Ready;
    }
    match predecessor {
        None => GateDecision::Ready,
        Some(pred) if !pred.is_single_pod() => GateDecision::Ready,
        Some(pred) if pred.status.phase.is_scheduled() => GateDecision::Ready,
        Some(_) => GateDecision::Wait,
    }
}
