//! Tether affinity inheritance — chained operations land near each other.
//!
//! When an operation declares that it runs after a predecessor, its pod can
//! inherit the node/zone/region placement that was observed for the
//! predecessor. This crate records those placement facts and turns them,
//! together with the declared strategy, into node-affinity terms that are
//! merged with the operation's own affinity.
//!
//! # Components
//!
//! - **`recorder`** — Capture a scheduled operation's placement facts
//! - **`strategy`** — Resolve a declared strategy into canonical form
//! - **`translate`** — Turn (strategy, facts) into hard/soft terms
//! - **`compose`** — Merge inherited terms into the base affinity
//! - **`gate`** — Whether a dependent may render its pod template yet
//! - **`template`** — The single entry point used by template generators
//! - **`state`** — Store-backed helpers over `tether-state`
//!
//! Everything except `state` is pure and synchronous.

pub mod compose;
pub mod error;
pub mod gate;
pub mod recorder;
pub mod settings;
pub mod state;
pub mod strategy;
pub mod template;
pub mod translate;

pub use compose::compose;
pub use error::{InheritError, InheritResult};
pub use gate::{GateDecision, predecessor_gate};
pub use recorder::{capture_placement, declared_label_keys, record_placement};
pub use settings::InheritanceSettings;
pub use state::{gate_for, inherited_affinity_for, record_scheduled};
pub use strategy::resolve;
pub use template::{PodTemplateGenerator, ValuesGenerator, inherit_affinity, inherit_for_operation};
pub use translate::{InheritedAffinity, translate};
