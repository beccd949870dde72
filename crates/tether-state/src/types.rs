//! Domain types for the Tether state store.
//!
//! Operations are pipeline steps. Their spec may name a predecessor to run
//! after, together with an [`AffinityStrategy`] that controls whether the
//! predecessor's observed placement is inherited. Their status carries the
//! placement facts recorded once the operation's pod was bound to a node.
//!
//! The node-affinity types mirror the platform's native JSON shape so they
//! can be handed to a pod-template generator as-is.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Label name → label value, as observed on the node an operation ran on.
pub type PlacementFacts = HashMap<String, String>;

// ── Node affinity ─────────────────────────────────────────────────

/// Operator of a node selector requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeSelectorOperator {
    In,
    NotIn,
    Exists,
    DoesNotExist,
    Gt,
    Lt,
}

/// A single `key <operator> values` expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSelectorRequirement {
    pub key: String,
    pub operator: NodeSelectorOperator,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

impl NodeSelectorRequirement {
    /// `key In [value]`, i.e. label equality.
    pub fn equals(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            operator: NodeSelectorOperator::In,
            values: vec![value.into()],
        }
    }
}

/// Expressions within a term are ANDed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSelectorTerm {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub match_expressions: Vec<NodeSelectorRequirement>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub match_fields: Vec<NodeSelectorRequirement>,
}

/// Terms within a selector are ORed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSelector {
    #[serde(default)]
    pub node_selector_terms: Vec<NodeSelectorTerm>,
}

/// A weighted soft term. Weights of matching terms add up at scoring time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferredSchedulingTerm {
    pub weight: i32,
    pub preference: NodeSelectorTerm,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeAffinity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_during_scheduling_ignored_during_execution: Option<NodeSelector>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preferred_during_scheduling_ignored_during_execution: Vec<PreferredSchedulingTerm>,
}

/// Pod affinity as submitted with the workload. Pod (anti-)affinity is not
/// interpreted here and is carried through verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Affinity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_affinity: Option<NodeAffinity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_affinity: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_anti_affinity: Option<serde_json::Value>,
}

// ── Affinity strategy ─────────────────────────────────────────────

/// Inheritance policy declared on a predecessor reference.
///
/// Persisted as a plain string (`""`, `"Require"`, `"Prefer"`). Any other
/// string is kept verbatim as [`AffinityPolicy::Unrecognized`] so the spec
/// round-trips unchanged; resolution treats it as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AffinityPolicy {
    #[default]
    None,
    Require,
    Prefer,
    Unrecognized(String),
}

impl From<String> for AffinityPolicy {
    fn from(value: String) -> Self {
        match value.as_str() {
            "" | "None" => AffinityPolicy::None,
            "Require" => AffinityPolicy::Require,
            "Prefer" => AffinityPolicy::Prefer,
            _ => AffinityPolicy::Unrecognized(value),
        }
    }
}

impl From<AffinityPolicy> for String {
    fn from(policy: AffinityPolicy) -> Self {
        match policy {
            AffinityPolicy::None => String::new(),
            AffinityPolicy::Require => "Require".to_string(),
            AffinityPolicy::Prefer => "Prefer".to_string(),
            AffinityPolicy::Unrecognized(raw) => raw,
        }
    }
}

impl fmt::Display for AffinityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AffinityPolicy::None => f.write_str("None"),
            AffinityPolicy::Require => f.write_str("Require"),
            AffinityPolicy::Prefer => f.write_str("Prefer"),
            AffinityPolicy::Unrecognized(raw) => write!(f, "{raw:?}"),
        }
    }
}

/// A label to prefer, and how much.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferLabel {
    pub name: String,
    pub weight: i32,
}

impl PreferLabel {
    pub fn new(name: impl Into<String>, weight: i32) -> Self {
        Self {
            name: name.into(),
            weight,
        }
    }
}

/// How a dependent operation inherits its predecessor's placement.
///
/// As declared by the user; defaults are applied when resolving, never
/// written back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffinityStrategy {
    #[serde(default)]
    pub policy: AffinityPolicy,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub require: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prefer: Vec<PreferLabel>,
}

/// Points at the operation this one runs after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredecessorRef {
    pub name: String,
    /// Defaults to the dependent operation's namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default)]
    pub affinity_strategy: AffinityStrategy,
}

// ── Operation ─────────────────────────────────────────────────────

/// Desired state of an operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationSpec {
    /// Number of pods backing the operation. Anything above one is a
    /// distributed run and never records placement facts.
    #[serde(default = "default_replicas")]
    pub replicas: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_after: Option<PredecessorRef>,
    /// User-declared affinity for the operation's pod.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affinity: Option<Affinity>,
}

fn default_replicas() -> u32 {
    1
}

impl Default for OperationSpec {
    fn default() -> Self {
        Self {
            replicas: default_replicas(),
            run_after: None,
            affinity: None,
        }
    }
}

/// Lifecycle phase of one operation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationPhase {
    #[default]
    Pending,
    Scheduled,
    Running,
    Succeeded,
    Failed,
}

impl OperationPhase {
    /// Whether the run has been bound to a node at some point.
    pub fn is_scheduled(self) -> bool {
        !matches!(self, OperationPhase::Pending)
    }
}

/// Observed state of the current run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationStatus {
    #[serde(default)]
    pub phase: OperationPhase,
    /// Monotonic run counter; a restart gets a new run id.
    #[serde(default)]
    pub run_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,
    /// Absent means "not yet recorded" or "multi-pod run".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_affinity_labels: Option<PlacementFacts>,
}

impl OperationStatus {
    /// Placement facts of the current run, if the run has reached
    /// `Scheduled`. Facts left over in an earlier phase are ignored.
    pub fn placement_facts(&self) -> Option<&PlacementFacts> {
        if !self.phase.is_scheduled() {
            return None;
        }
        self.node_affinity_labels.as_ref()
    }
}

/// A pipeline step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub namespace: String,
    pub name: String,
    /// Bumped by the store on every write.
    #[serde(default)]
    pub resource_version: u64,
    #[serde(default)]
    pub spec: OperationSpec,
    #[serde(default)]
    pub status: OperationStatus,
}

impl Operation {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Build the composite key for the operations table.
    pub fn table_key(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }

    /// Table key of the predecessor, if this operation runs after one.
    pub fn predecessor_key(&self) -> Option<String> {
        self.spec.run_after.as_ref().map(|pred| {
            let namespace = pred.namespace.as_deref().unwrap_or(&self.namespace);
            format!("{namespace}/{}", pred.name)
        })
    }

    pub fn is_single_pod(&self) -> bool {
        self.spec.replicas <= 1
    }

    /// The declared inheritance strategy, or the default (`None`) when the
    /// operation has no predecessor.
    pub fn affinity_strategy(&self) -> AffinityStrategy {
        self.spec
            .run_after
            .as_ref()
            .map(|pred| pred.affinity_strategy.clone())
            .unwrap_or_default()
    }
}

// ── Node ──────────────────────────────────────────────────────────

/// A cluster node and its labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    pub name: String,
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

impl NodeInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            labels: HashMap::new(),
        }
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }
}
