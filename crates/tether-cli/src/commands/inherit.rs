use std::path::Path;

use tether_affinity::{
    GateDecision, PodTemplateGenerator, ValuesGenerator, inherit_for_operation, predecessor_gate,
};
use tether_state::{Affinity, NodeSelectorRequirement, NodeSelectorTerm, Operation};

use super::{load_settings, read_json};

pub fn inherit(
    operation: &Path,
    predecessor: Option<&Path>,
    config: Option<&Path>,
    format: &str,
) -> anyhow::Result<()> {
    let settings = load_settings(config)?;
    let (op, pred) = read_operations(operation, predecessor)?;

    match format {
        "values" => {
            let values = ValuesGenerator.generate(&op, pred.as_ref(), &settings)?;
            println!("{}", serde_json::to_string_pretty(&values)?);
        }
        "json" => {
            let affinity = inherit_for_operation(&op, pred.as_ref(), &settings);
            println!("{}", serde_json::to_string_pretty(&affinity)?);
        }
        _ => {
            let affinity = inherit_for_operation(&op, pred.as_ref(), &settings);
            println!("{}", format_affinity(affinity.as_ref()));
        }
    }

    Ok(())
}

pub fn gate(operation: &Path, predecessor: Option<&Path>, config: Option<&Path>) -> anyhow::Result<()> {
    match gate_decision(operation, predecessor, config)? {
        GateDecision::Ready => println!("ready"),
        GateDecision::Wait => println!("wait"),
    }
    Ok(())
}

/// Gate decision for the operation file against the predecessor file.
pub fn gate_decision(
    operation: &Path,
    predecessor: Option<&Path>,
    config: Option<&Path>,
) -> anyhow::Result<GateDecision> {
    let settings = load_settings(config)?;
    let (op, pred) = read_operations(operation, predecessor)?;
    Ok(predecessor_gate(&op.affinity_strategy(), pred.as_ref(), &settings))
}

fn read_operations(
    operation: &Path,
    predecessor: Option<&Path>,
) -> anyhow::Result<(Operation, Option<Operation>)> {
    let op: Operation = read_json(operation)?;
    let pred = predecessor.map(read_json::<Operation>).transpose()?;
    Ok((op, pred))
}

/// Human-readable summary of node affinity.
pub fn format_affinity(affinity: Option<&Affinity>) -> String {
    let Some(node_affinity) = affinity.and_then(|a| a.node_affinity.as_ref()) else {
        return "no node affinity".to_string();
    };

    let mut lines = Vec::new();
    let required = node_affinity
        .required_during_scheduling_ignored_during_execution
        .as_ref()
        .map(|s| s.node_selector_terms.as_slice())
        .unwrap_or_default();
    for (i, term) in required.iter().enumerate() {
        lines.push(format!("required[{i}]: {}", format_term(term)));
    }
    for (i, term) in node_affinity
        .preferred_during_scheduling_ignored_during_execution
        .iter()
        .enumerate()
    {
        lines.push(format!(
            "preferred[{i}] weight={}: {}",
            term.weight,
            format_term(&term.preference)
        ));
    }

    if lines.is_empty() {
        return "no node affinity".to_string();
    }
    lines.join("\n")
}

fn format_term(term: &NodeSelectorTerm) -> String {
    term.match_expressions
        .iter()
        .map(format_requirement)
        .collect::<Vec<_>>()
        .join(" AND ")
}

fn format_requirement(req: &NodeSelectorRequirement) -> String {
    if req.values.is_empty() {
        format!("{} {:?}", req.key, req.operator)
    } else {
        format!("{} {:?} [{}]", req.key, req.operator, req.values.join(", "))
    }
}
