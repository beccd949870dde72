//! The one inheritance computation every template generator goes through.
//!
//! Workload engines differ in what they render, but not in how inherited
//! affinity is computed. [`inherit_affinity`] is that computation;
//! [`PodTemplateGenerator::generate`] wires it in front of an engine's own
//! `render` so no engine re-implements it.

use serde_json::{Value, json};
use tether_state::{Affinity, AffinityPolicy, AffinityStrategy, Operation, PlacementFacts};

use crate::compose::compose;
use crate::settings::InheritanceSettings;
use crate::strategy::resolve;
use crate::translate::translate;

/// Resolve → translate → compose.
///
/// Pure: the same inputs always give the same output and no input is
/// modified. `facts` of `None` (or empty) leaves `base` as it is.
pub fn inherit_affinity(
    base: Option<&Affinity>,
    facts: Option<&PlacementFacts>,
    strategy: &AffinityStrategy,
    settings: &InheritanceSettings,
) -> Option<Affinity> {
    let canonical = resolve(strategy, settings);
    let inherited = translate(&canonical, facts);
    compose(base, inherited.as_ref())
}

/// Final affinity for `op`, given a snapshot of its predecessor.
///
/// Only the predecessor's current-run facts are consulted; a predecessor
/// that is missing or not yet scheduled contributes nothing.
pub fn inherit_for_operation(
    op: &Operation,
    predecessor: Option<&Operation>,
    settings: &InheritanceSettings,
) -> Option<Affinity> {
    let facts = predecessor.and_then(|pred| pred.status.placement_facts());
    inherit_affinity(
        op.spec.affinity.as_ref(),
        facts,
        &op.affinity_strategy(),
        settings,
    )
}

/// A workload-engine-specific pod template generator.
pub trait PodTemplateGenerator {
    type Output;

    /// Engine name, for logs.
    fn engine(&self) -> &str;

    /// Render the engine's workload with the final affinity.
    fn render(&self, op: &Operation, affinity: Option<Affinity>) -> Self::Output;

    /// Compute inherited affinity and render.
    fn generate(
        &self,
        op: &Operation,
        predecessor: Option<&Operation>,
        settings: &InheritanceSettings,
    ) -> Self::Output {
        let affinity = inherit_for_operation(op, predecessor, settings);
        tracing::debug!(
            engine = self.engine(),
            operation = %op.table_key(),
            inherited = op.affinity_strategy().policy != AffinityPolicy::None,
            "rendering pod template"
        );
        self.render(op, affinity)
    }
}

/// Produces a values document (`name`, `namespace`, `replicas`, `affinity`)
/// for a chart-based workload renderer.
#[derive(Debug, Clone, Default)]
pub struct ValuesGenerator;

impl PodTemplateGenerator for ValuesGenerator {
    type Output = serde_json::Result<Value>;

    fn engine(&self) -> &str {
        "values"
    }

    fn render(&self, op: &Operation, affinity: Option<Affinity>) -> Self::Output {
        let mut values = json!({
            "name": op.name,
            "namespace": op.namespace,
            "replicas": op.spec.replicas,
        });
        if let Some(affinity) = affinity {
            values["affinity"] = serde_json::to_value(affinity)?;
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_state::{OperationPhase, PredecessorRef};

    const HOST: &str = "kubernetes.io/hostname";

    fn scheduled_predecessor() -> Operation {
        let mut pred = Operation::new("etl", "extract");
        pred.status.phase = OperationPhase::Running;
        pred.status.node_affinity_labels =
            Some(PlacementFacts::from([(HOST.to_string(), "n1".to_string())]));
        pred
    }

    fn dependent(policy: AffinityPolicy) -> Operation {
        let mut op = Operation::new("etl", "transform");
        op.spec.run_after = Some(PredecessorRef {
            name: "extract".to_string(),
            namespace: None,
            affinity_strategy: AffinityStrategy {
                policy,
                ..Default::default()
            },
        });
        op
    }

    #[test]
    fn require_default_pins_to_predecessor_host() {
        let out = inherit_for_operation(
            &dependent(AffinityPolicy::Require),
            Some(&scheduled_predecessor()),
            &InheritanceSettings::default(),
        )
        .unwrap();
        let json = serde_json::to_value(out).unwrap();
        assert_eq!(
            json["nodeAffinity"]["requiredDuringSchedulingIgnoredDuringExecution"]
                ["nodeSelectorTerms"][0]["matchExpressions"][0],
            json!({"key": HOST, "operator": "In", "values": ["n1"]})
        );
    }

    #[test]
    fn pending_predecessor_facts_are_ignored() {
        let mut pred = scheduled_predecessor();
        pred.status.phase = OperationPhase::Pending;
        let out = inherit_for_operation(
            &dependent(AffinityPolicy::Require),
            Some(&pred),
            &InheritanceSettings::default(),
        );
        assert!(out.is_none());
    }

    #[test]
    fn no_predecessor_ref_keeps_base() {
        let op = Operation::new("etl", "standalone");
        let out = inherit_for_operation(
            &op,
            Some(&scheduled_predecessor()),
            &InheritanceSettings::default(),
        );
        assert!(out.is_none());
    }

    #[test]
    fn values_generator_renders_affinity() {
        let values = ValuesGenerator.generate(
            &dependent(AffinityPolicy::Prefer),
            Some(&scheduled_predecessor()),
            &InheritanceSettings::default(),
        )
        .unwrap();
        assert_eq!(values["name"], "transform");
        assert_eq!(values["replicas"], 1);
        let preferred =
            &values["affinity"]["nodeAffinity"]["preferredDuringSchedulingIgnoredDuringExecution"];
        assert_eq!(preferred[0]["weight"], 100);
    }

    #[test]
    fn values_generator_keeps_base_affinity_with_inherited_terms() {
        let mut op = dependent(AffinityPolicy::Require);
        op.spec.affinity = Some(Affinity {
            pod_anti_affinity: Some(json!({"topologyKey": HOST})),
            ..Default::default()
        });
        let values = ValuesGenerator
            .generate(&op, Some(&scheduled_predecessor()), &InheritanceSettings::default())
            .unwrap();
        assert_eq!(values["affinity"]["podAntiAffinity"], json!({"topologyKey": HOST}));
        assert_eq!(
            values["affinity"]["nodeAffinity"]["requiredDuringSchedulingIgnoredDuringExecution"]
                ["nodeSelectorTerms"][0]["matchExpressions"][0]["values"],
            json!(["n1"])
        );
    }

    #[test]
    fn values_generator_omits_absent_affinity() {
        let values = ValuesGenerator.generate(
            &dependent(AffinityPolicy::None),
            Some(&scheduled_predecessor()),
            &InheritanceSettings::default(),
        )
        .unwrap();
        assert!(values.get("affinity").is_none());
    }
}
